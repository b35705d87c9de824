//! Oriented per-door entry triggers.
//!
//! An alternative to the whole-building [`InteractionZone`](crate::interaction::InteractionZone):
//! each building gets one door on a chosen side, a trigger rect in front of
//! that door, and a facing check so the actor must approach from outside.
//! [`BuildingManager`](crate::manager::BuildingManager) does not consult
//! this system; callers that want door-only entry query it themselves and
//! then call `enter_building`.
//!
//! Door placement for a building rect `B` (door size `w × h`):
//!
//! | Side | Door top-left | Trigger rect |
//! |------|---------------|--------------|
//! | North | `(B.cx − w/2, B.top − h)` | above the door |
//! | South | `(B.cx − w/2, B.bottom)` | below the door |
//! | East | `(B.right, B.cy − h/2)` | right of the door |
//! | West | `(B.left − w, B.cy − h/2)` | left of the door |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::building::{Building, BuildingId};
use crate::geometry::{Point, Rect};

/// Minimum distance (px) the actor's centre must be past the door centre
/// on the approach side.
pub const FACING_MARGIN: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorSide {
    North,
    #[default]
    South,
    East,
    West,
}

impl DoorSide {
    /// Side a building type's door faces. Temples face west; everything
    /// else faces south.
    pub fn for_building_type(building_type: &str) -> Self {
        if building_type.to_ascii_lowercase().contains("temple") {
            DoorSide::West
        } else {
            DoorSide::South
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub side: DoorSide,
    pub door_width: i32,
    pub door_height: i32,
    pub interaction_padding: i32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            side: DoorSide::South,
            door_width: 40,
            door_height: 20,
            interaction_padding: 25,
        }
    }
}

impl DoorConfig {
    pub fn facing(side: DoorSide) -> Self {
        Self {
            side,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorTrigger {
    pub rect: Rect,
    pub interaction_rect: Rect,
    pub config: DoorConfig,
}

impl DoorTrigger {
    pub fn for_building(building_rect: &Rect, config: DoorConfig) -> Self {
        let (w, h, pad) = (config.door_width, config.door_height, config.interaction_padding);
        let (door_x, door_y) = match config.side {
            DoorSide::North => (building_rect.center_x() - w / 2, building_rect.top() - h),
            DoorSide::South => (building_rect.center_x() - w / 2, building_rect.bottom()),
            DoorSide::East => (building_rect.right(), building_rect.center_y() - h / 2),
            DoorSide::West => (building_rect.left() - w, building_rect.center_y() - h / 2),
        };
        let interaction_rect = match config.side {
            DoorSide::North => Rect::new(door_x - pad, door_y - pad, w + pad * 2, pad + h / 2),
            DoorSide::South => Rect::new(door_x - pad, door_y + h - h / 2, w + pad * 2, pad + h / 2),
            DoorSide::East => Rect::new(door_x + w - w / 2, door_y - pad, pad + w / 2, h + pad * 2),
            DoorSide::West => Rect::new(door_x - pad, door_y - pad, pad + w / 2, h + pad * 2),
        };
        Self {
            rect: Rect::new(door_x, door_y, w, h),
            interaction_rect,
            config,
        }
    }

    pub fn side(&self) -> DoorSide {
        self.config.side
    }

    pub fn position(&self) -> Point {
        Point::new(self.rect.x, self.rect.y)
    }

    /// The actor's centre is on the outside of the door by more than
    /// [`FACING_MARGIN`].
    pub fn is_facing(&self, actor_rect: &Rect) -> bool {
        let door = self.rect.center();
        let actor = actor_rect.center();
        match self.config.side {
            DoorSide::North => actor.y < door.y - FACING_MARGIN,
            DoorSide::South => actor.y > door.y + FACING_MARGIN,
            DoorSide::East => actor.x > door.x + FACING_MARGIN,
            DoorSide::West => actor.x < door.x - FACING_MARGIN,
        }
    }

    pub fn can_trigger(&self, actor_rect: &Rect) -> bool {
        self.interaction_rect.intersects(actor_rect) && self.is_facing(actor_rect)
    }
}

/// Door triggers keyed by building.
#[derive(Debug, Clone, Default)]
pub struct DoorTriggerSystem {
    doors: BTreeMap<BuildingId, DoorTrigger>,
}

impl DoorTriggerSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place (or replace) the door of `building`.
    pub fn register(&mut self, building: &Building, config: DoorConfig) {
        self.doors
            .insert(building.id(), DoorTrigger::for_building(&building.rect(), config));
    }

    /// Register every building with the default door for its type.
    pub fn register_defaults(&mut self, buildings: &[Building]) {
        for building in buildings {
            let side = DoorSide::for_building_type(building.kind().key());
            self.register(building, DoorConfig::facing(side));
        }
    }

    pub fn unregister(&mut self, id: BuildingId) -> bool {
        self.doors.remove(&id).is_some()
    }

    /// Recompute the door after the building moved.
    pub fn update_building_position(&mut self, building: &Building) -> bool {
        match self.doors.get_mut(&building.id()) {
            Some(door) => {
                *door = DoorTrigger::for_building(&building.rect(), door.config);
                true
            }
            None => false,
        }
    }

    pub fn door(&self, id: BuildingId) -> Option<&DoorTrigger> {
        self.doors.get(&id)
    }

    pub fn get_door_position(&self, id: BuildingId) -> Option<Point> {
        self.door(id).map(DoorTrigger::position)
    }

    /// First enterable building whose door the actor can use.
    pub fn check_door_interaction(&self, actor_rect: &Rect, buildings: &[Building]) -> Option<BuildingId> {
        buildings
            .iter()
            .filter(|b| b.can_enter())
            .find(|b| {
                self.doors
                    .get(&b.id())
                    .is_some_and(|door| door.can_trigger(actor_rect))
            })
            .map(Building::id)
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    pub fn clear(&mut self) {
        self.doors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildingKind, BuildingTypeConfig};
    use crate::geometry::Size;

    fn house(id: u32, x: i32, y: i32) -> Building {
        Building::new(
            BuildingId(id),
            BuildingKind::House,
            BuildingTypeConfig::house(),
            x,
            y,
            Size::new(128, 128),
        )
    }

    fn actor_at(cx: i32, cy: i32) -> Rect {
        Rect::from_center(cx, cy, 32, 32)
    }

    #[test]
    fn door_geometry_per_side() {
        let b = Rect::new(100, 100, 128, 128);
        let south = DoorTrigger::for_building(&b, DoorConfig::facing(DoorSide::South));
        assert_eq!(south.rect, Rect::new(144, 228, 40, 20));
        assert_eq!(south.interaction_rect, Rect::new(119, 238, 90, 35));

        let north = DoorTrigger::for_building(&b, DoorConfig::facing(DoorSide::North));
        assert_eq!(north.rect, Rect::new(144, 80, 40, 20));
        assert_eq!(north.interaction_rect, Rect::new(119, 55, 90, 35));

        let east = DoorTrigger::for_building(&b, DoorConfig::facing(DoorSide::East));
        assert_eq!(east.rect, Rect::new(228, 154, 40, 20));
        assert_eq!(east.interaction_rect, Rect::new(248, 129, 45, 70));

        let west = DoorTrigger::for_building(&b, DoorConfig::facing(DoorSide::West));
        assert_eq!(west.rect, Rect::new(60, 154, 40, 20));
        assert_eq!(west.interaction_rect, Rect::new(35, 129, 45, 70));
    }

    #[test]
    fn facing_check_requires_approach_side() {
        let b = Rect::new(100, 100, 128, 128);
        let south = DoorTrigger::for_building(&b, DoorConfig::default());
        assert!(south.can_trigger(&actor_at(164, 260)));
        // In the trigger rect but not far enough past the door centre
        assert!(south.interaction_rect.intersects(&actor_at(164, 240)));
        assert!(!south.can_trigger(&actor_at(164, 240)));

        let west = DoorTrigger::for_building(&b, DoorConfig::facing(DoorSide::West));
        assert!(west.can_trigger(&actor_at(50, 164)));
        assert!(!west.can_trigger(&actor_at(75, 164)));
    }

    #[test]
    fn system_tracks_moves() {
        let mut a = house(0, 100, 100);
        let mut system = DoorTriggerSystem::new();
        system.register_defaults(std::slice::from_ref(&a));
        assert_eq!(system.get_door_position(BuildingId(0)), Some(Point::new(144, 228)));

        a.update_position(500, 500);
        assert!(system.update_building_position(&a));
        assert_eq!(system.get_door_position(BuildingId(0)), Some(Point::new(544, 628)));
        assert!(!system.update_building_position(&house(9, 0, 0)));
    }

    #[test]
    fn check_door_interaction_finds_building() {
        let buildings = vec![house(0, 100, 100), house(1, 400, 100)];
        let mut system = DoorTriggerSystem::new();
        system.register_defaults(&buildings);
        assert_eq!(system.len(), 2);
        assert_eq!(
            system.check_door_interaction(&actor_at(464, 260), &buildings),
            Some(BuildingId(1))
        );
        assert_eq!(system.check_door_interaction(&actor_at(164, 150), &buildings), None);
        assert!(system.unregister(BuildingId(1)));
        assert_eq!(system.check_door_interaction(&actor_at(464, 260), &buildings), None);
    }

    #[test]
    fn temples_face_west() {
        assert_eq!(DoorSide::for_building_type("Old_Temple"), DoorSide::West);
        assert_eq!(DoorSide::for_building_type("shop"), DoorSide::South);
    }
}
