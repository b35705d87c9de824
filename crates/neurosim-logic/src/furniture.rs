//! Interior furniture: placement, chair occupancy and the per-frame
//! interaction controller.
//!
//! Furniture only exists inside an [`InteriorManager`](crate::interior::InteriorManager),
//! so every query here is interior-scoped. Outside, nothing is interactable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, InputState};
use crate::building::BuildingId;
use crate::constants::furniture::{
    HITBOX_MARGIN, INTERACTION_COOLDOWN_FRAMES, INTERACTION_MARGIN, SIT_RAISE,
    STAND_FALLBACK_OFFSET, STAND_OFFSET,
};
use crate::geometry::{Padding, Point, Rect, Size, Vec2};
use crate::manager::BuildingManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FurnitureId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FurnitureKind {
    Chair,
    Table,
    Other(String),
}

impl FurnitureKind {
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "chair" => FurnitureKind::Chair,
            "table" => FurnitureKind::Table,
            _ => FurnitureKind::Other(key.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            FurnitureKind::Chair => "chair",
            FurnitureKind::Table => "table",
            FurnitureKind::Other(name) => name,
        }
    }
}

impl fmt::Display for FurnitureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Geometry policy for a furniture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnitureConfig {
    pub hitbox_padding: Padding,
    /// Margin added on every side of the sprite rect for interaction.
    pub interaction_padding: i32,
    pub is_solid: bool,
}

impl Default for FurnitureConfig {
    fn default() -> Self {
        Self {
            hitbox_padding: Padding::uniform(HITBOX_MARGIN),
            interaction_padding: INTERACTION_MARGIN,
            is_solid: true,
        }
    }
}

impl FurnitureConfig {
    pub fn chair() -> Self {
        Self {
            hitbox_padding: Padding::uniform(HITBOX_MARGIN),
            interaction_padding: INTERACTION_MARGIN,
            ..Self::default()
        }
    }

    pub fn table() -> Self {
        Self {
            hitbox_padding: Padding::uniform(HITBOX_MARGIN),
            interaction_padding: INTERACTION_MARGIN,
            is_solid: true,
        }
    }

    /// Policy for `kind`. Unrecognised kinds get the default.
    pub fn for_kind(kind: &FurnitureKind) -> Self {
        match kind {
            FurnitureKind::Chair => Self::chair(),
            FurnitureKind::Table => Self::table(),
            FurnitureKind::Other(name) => {
                log::debug!("No furniture policy for '{}', using default", name);
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureEntity {
    pub id: FurnitureId,
    pub kind: FurnitureKind,
    pub config: FurnitureConfig,
    pub position: Point,
    pub rect: Rect,
    pub hitbox: Rect,
    pub interaction_zone: Rect,
    pub is_occupied: bool,
    pub is_solid: bool,
}

impl FurnitureEntity {
    pub fn new(id: FurnitureId, kind: FurnitureKind, x: i32, y: i32, sprite: Size) -> Self {
        let config = FurnitureConfig::for_kind(&kind);
        let rect = Rect::from_size(x, y, sprite);
        Self {
            id,
            kind,
            config,
            position: Point::new(x, y),
            rect,
            hitbox: config.hitbox_padding.apply(&rect),
            interaction_zone: rect.inflate(config.interaction_padding),
            is_occupied: false,
            is_solid: config.is_solid,
        }
    }

    /// Move the piece, recomputing the rect, hitbox and zone together.
    pub fn update_position(&mut self, x: i32, y: i32) {
        self.position = Point::new(x, y);
        self.rect = self.rect.with_top_left(x, y);
        self.hitbox = self.config.hitbox_padding.apply(&self.rect);
        self.interaction_zone = self.rect.inflate(self.config.interaction_padding);
    }

    pub fn check_collision(&self, other: &Rect) -> bool {
        self.hitbox.intersects(other)
    }

    pub fn check_interaction_range(&self, other: &Rect) -> bool {
        self.interaction_zone.intersects(other)
    }

    /// Where a seated actor's centre goes.
    pub fn seat_anchor(&self) -> Vec2 {
        Vec2::new(
            (self.position.x + self.rect.width / 2) as f32,
            (self.position.y - SIT_RAISE + self.rect.height / 2) as f32,
        )
    }

    fn center(&self) -> Vec2 {
        Vec2::new(
            (self.position.x + self.rect.width / 2) as f32,
            (self.position.y + self.rect.height / 2) as f32,
        )
    }
}

/// Seat the actor. Fails on anything but a free chair.
pub fn sit_on_chair(furniture: &mut FurnitureEntity, actor: &mut Actor) -> bool {
    if furniture.kind != FurnitureKind::Chair || furniture.is_occupied {
        return false;
    }
    let seat = furniture.seat_anchor();
    actor.set_position(seat.x, seat.y);
    furniture.is_occupied = true;
    actor.is_sitting = true;
    actor.can_move = false;
    log::debug!("Actor sat on {} {:?}", furniture.kind, furniture.id);
    true
}

/// Stand the actor up beside the chair, to the right unless that spot
/// still overlaps the chair.
pub fn stand_up(furniture: &mut FurnitureEntity, actor: &mut Actor) -> bool {
    if furniture.kind != FurnitureKind::Chair || !furniture.is_occupied {
        return false;
    }
    let size = actor.size();
    let y = furniture.position.y + furniture.rect.height / 2;
    let mut x = furniture.position.x + furniture.rect.width + STAND_OFFSET;
    if Rect::from_center(x, y, size.width, size.height).intersects(&furniture.rect) {
        x = furniture.position.x + furniture.rect.width - STAND_FALLBACK_OFFSET;
    }
    actor.set_position(x as f32, y as f32);
    furniture.is_occupied = false;
    actor.is_sitting = false;
    actor.can_move = true;
    log::debug!("Actor stood up from {} {:?}", furniture.kind, furniture.id);
    true
}

/// Read-only table interaction.
pub fn examine_table(furniture: &FurnitureEntity) -> bool {
    if furniture.kind != FurnitureKind::Table {
        return false;
    }
    log::info!("Examining table {:?}", furniture.id);
    true
}

/// What one interaction press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FurnitureAction {
    Sat(FurnitureId),
    Stood(FurnitureId),
    Examined(FurnitureId),
    /// In range of a kind with no behaviour.
    Ignored(FurnitureId),
}

pub const PROMPT_SIT: &str = "Press E to sit down";
pub const PROMPT_STAND: &str = "Press E to stand up";
pub const PROMPT_TABLE: &str = "Press E to examine table";
pub const PROMPT_OTHER: &str = "Press E to interact";

/// Per-frame furniture interaction for the player.
#[derive(Debug, Clone, Default)]
pub struct FurnitureInteractionController {
    cooldown: u32,
    /// Chair the actor is currently sitting on.
    current: Option<(BuildingId, FurnitureId)>,
}

impl FurnitureInteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn current_interaction(&self) -> Option<(BuildingId, FurnitureId)> {
        self.current
    }

    /// One frame. A running cooldown ticks down and swallows the frame.
    pub fn update(
        &mut self,
        manager: &mut BuildingManager,
        actor: &mut Actor,
        input: InputState,
    ) -> Option<FurnitureAction> {
        // The held chair's space is no longer active: free the seat and
        // the actor where they are, without moving them back inside.
        if let Some((held_in, chair)) = self.current {
            if manager.current_building() != Some(held_in) {
                self.current = None;
                if let Some(furniture) = manager
                    .building_mut(held_in)
                    .and_then(|b| b.interior_mut())
                    .and_then(|interior| interior.furniture_mut(chair))
                {
                    furniture.is_occupied = false;
                }
                release_actor(actor);
                log::debug!("Released chair {:?} in {:?} after leaving it", chair, held_in);
                return Some(FurnitureAction::Stood(chair));
            }
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }
        if !input.interact {
            return None;
        }
        let building = manager.current_building()?;
        // While seated, the held chair is the only target
        let target = match self.current {
            Some((held_in, chair)) if held_in == building => chair,
            _ => closest(manager, actor)?,
        };

        let furniture = manager
            .current_interior_mut()?
            .furniture_mut(target)?;
        let action = match furniture.kind {
            FurnitureKind::Chair if !furniture.is_occupied => {
                sit_on_chair(furniture, actor);
                self.current = Some((building, target));
                FurnitureAction::Sat(target)
            }
            FurnitureKind::Chair => {
                stand_up(furniture, actor);
                self.current = None;
                FurnitureAction::Stood(target)
            }
            FurnitureKind::Table => {
                examine_table(furniture);
                FurnitureAction::Examined(target)
            }
            FurnitureKind::Other(ref name) => {
                log::debug!("No interaction for furniture type '{}'", name);
                FurnitureAction::Ignored(target)
            }
        };
        self.cooldown = INTERACTION_COOLDOWN_FRAMES;
        Some(action)
    }

    pub fn get_interaction_prompt(
        &self,
        manager: &BuildingManager,
        actor: &Actor,
    ) -> Option<&'static str> {
        let target = match (self.current, manager.current_building()) {
            (Some((held_in, chair)), Some(building)) if held_in == building => chair,
            _ => closest(manager, actor)?,
        };
        let furniture = manager.current_interior()?.furniture_by_id(target)?;
        Some(match furniture.kind {
            FurnitureKind::Chair if furniture.is_occupied => PROMPT_STAND,
            FurnitureKind::Chair => PROMPT_SIT,
            FurnitureKind::Table => PROMPT_TABLE,
            FurnitureKind::Other(_) => PROMPT_OTHER,
        })
    }

    /// Stand the actor up from the chair they hold, wherever it is.
    pub fn reset_interaction(&mut self, manager: &mut BuildingManager, actor: &mut Actor) -> bool {
        let Some((building, chair)) = self.current.take() else {
            return false;
        };
        match manager
            .building_mut(building)
            .and_then(|b| b.interior_mut())
            .and_then(|interior| interior.furniture_mut(chair))
        {
            Some(furniture) if furniture.is_occupied => stand_up(furniture, actor),
            _ => {
                log::warn!("Held chair {:?} in {:?} is gone or already free", chair, building);
                release_actor(actor);
                true
            }
        }
    }
}

fn release_actor(actor: &mut Actor) {
    actor.is_sitting = false;
    actor.can_move = true;
}

/// Closest in-range furniture to the actor's centre; ties keep the first.
fn closest(manager: &BuildingManager, actor: &Actor) -> Option<FurnitureId> {
    let position = actor.position();
    let mut best: Option<(f32, FurnitureId)> = None;
    for furniture in manager.get_interactable_furniture(&actor.rect()) {
        let distance = position.distance(&furniture.center());
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, furniture.id));
        }
    }
    best.map(|(_, id)| id)
}
