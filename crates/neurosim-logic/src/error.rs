//! Errors for the few fallible boundaries: parsing declarative data.
//!
//! Runtime operations on buildings, interiors and furniture never error;
//! they report `false`/`None` instead.

use thiserror::Error;

/// Failure to load a building list or a custom building catalog.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The JSON document did not match the expected shape.
    #[error("invalid layout JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A building entry had an empty `building_type`.
    #[error("building #{index} has an empty building_type")]
    MissingBuildingType { index: usize },
    /// An enterable building type declared a non-positive interior.
    #[error("building type '{kind}' has a non-positive interior size {width}x{height}")]
    NonPositiveSize {
        kind: String,
        width: i32,
        height: i32,
    },
}
