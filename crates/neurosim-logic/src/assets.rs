//! Asset metadata the spatial core needs: sprite dimensions per type key
//! and the floor-tile palette for interiors. Pixel data stays with the
//! renderer; only sizes and tile ids cross this boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::world::FALLBACK_SPRITE;
use crate::geometry::Size;

/// Index of a floor tile in the renderer's tile set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub u16);

/// Tiles an interior floor may be filled with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorPalette {
    pub tiles: Vec<TileId>,
}

impl FloorPalette {
    pub fn new(tiles: Vec<TileId>) -> Self {
        Self { tiles }
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetCatalog {
    /// First-frame sprite size keyed by building/furniture type.
    #[serde(default)]
    pub sprites: HashMap<String, Size>,
    #[serde(default)]
    pub floor_tiles: FloorPalette,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(mut self, key: &str, size: Size) -> Self {
        self.sprites.insert(key.to_string(), size);
        self
    }

    pub fn with_floor_tiles(mut self, tiles: Vec<TileId>) -> Self {
        self.floor_tiles = FloorPalette::new(tiles);
        self
    }

    /// Sprite size for `key`; missing keys fall back to a fixed size.
    pub fn sprite_size(&self, key: &str) -> Size {
        match self.sprites.get(key) {
            Some(size) => *size,
            None => {
                log::warn!("No sprite registered for '{}', using fallback size", key);
                Size::new(FALLBACK_SPRITE.0, FALLBACK_SPRITE.1)
            }
        }
    }

    /// Sizes matching the bundled game art.
    pub fn standard() -> Self {
        Self::new()
            .with_sprite("house", Size::new(128, 128))
            .with_sprite("shop", Size::new(160, 128))
            .with_sprite("fountain", Size::new(48, 48))
            .with_sprite("town_hall", Size::new(192, 160))
            .with_sprite("food_shop", Size::new(144, 128))
            .with_sprite("chair", Size::new(64, 64))
            .with_sprite("table", Size::new(96, 64))
            .with_floor_tiles((0..4).map(TileId).collect())
    }
}
