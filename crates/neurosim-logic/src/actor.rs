//! The moving actor (player or NPC body) as seen by the spatial core.
//!
//! Position is the source of truth; the collision rect is always derived
//! from it, centred, so the two cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::constants::world::ACTOR_SIZE;
use crate::geometry::{Rect, Size, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Per-frame input relevant to interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// The interact key is held this frame.
    pub interact: bool,
}

impl InputState {
    pub const IDLE: Self = Self { interact: false };
    pub const INTERACT: Self = Self { interact: true };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    position: Vec2,
    size: Size,
    pub facing: Facing,
    pub is_sitting: bool,
    pub can_move: bool,
}

impl Actor {
    pub fn new(x: f32, y: f32) -> Self {
        Self::with_size(x, y, Size::new(ACTOR_SIZE.0, ACTOR_SIZE.1))
    }

    pub fn with_size(x: f32, y: f32, size: Size) -> Self {
        Self {
            position: Vec2::new(x, y),
            size,
            facing: Facing::default(),
            is_sitting: false,
            can_move: true,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Collision rect centred on the (rounded) position.
    pub fn rect(&self) -> Rect {
        Rect::from_center(
            self.position.x.round() as i32,
            self.position.y.round() as i32,
            self.size.width,
            self.size.height,
        )
    }

    /// Move by a delta, updating facing from the horizontal component.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        if dx < 0.0 {
            self.facing = Facing::Left;
        } else if dx > 0.0 {
            self.facing = Facing::Right;
        }
        self.position.x += dx;
        self.position.y += dy;
    }

    /// Shift the position by however far `resolved` moved away from the
    /// current rect. Keeps the sub-pixel part of the position.
    pub fn follow_rect(&mut self, resolved: &Rect) {
        let current = self.rect();
        let dx = resolved.x - current.x;
        let dy = resolved.y - current.y;
        self.position.x += dx as f32;
        self.position.y += dy as f32;
    }
}
