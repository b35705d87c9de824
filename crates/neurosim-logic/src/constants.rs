//! Game tunables for interior layout, furniture and world fallbacks.
//!
//! Plain `const`s with no runtime dependency; both the library and the
//! headless harness read them.

/// Interior anchor placement (pixels, interior coordinates).
pub mod interior {
    /// Entrance anchor sits this far above the bottom edge.
    pub const ENTRANCE_OFFSET_FROM_BOTTOM: i32 = 50;
    /// Exit anchor sits this far below the top edge.
    pub const EXIT_OFFSET_FROM_TOP: i32 = 50;
    /// Exit trigger rectangle, centred on the exit anchor.
    pub const EXIT_ZONE_WIDTH: i32 = 100;
    pub const EXIT_ZONE_HEIGHT: i32 = 60;
}

/// Furniture interaction tuning.
pub mod furniture {
    /// Frames during which a fresh interaction is ignored.
    pub const INTERACTION_COOLDOWN_FRAMES: u32 = 30;
    /// Seated actors are drawn this far above the seat's centre.
    pub const SIT_RAISE: i32 = 20;
    /// Standing up lands this far to the right of the chair.
    pub const STAND_OFFSET: i32 = 20;
    /// Fallback when the default stand point still overlaps the chair:
    /// measured back from the chair's right edge.
    pub const STAND_FALLBACK_OFFSET: i32 = 60;
    /// Default rect inset for every furniture hitbox.
    pub const HITBOX_MARGIN: i32 = 20;
    /// Default interaction padding around furniture.
    pub const INTERACTION_MARGIN: i32 = 10;
}

/// World and asset fallbacks.
pub mod world {
    /// Square exterior world edge length.
    pub const WORLD_SIZE: i32 = 3000;
    /// Sprite size used when an asset key is missing.
    pub const FALLBACK_SPRITE: (i32, i32) = (64, 64);
    /// Default actor collision box.
    pub const ACTOR_SIZE: (i32, i32) = (32, 32);
    /// Interior floor tile edge.
    pub const TILE_SIZE: i32 = 32;
}
