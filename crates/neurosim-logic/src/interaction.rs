//! Entry zones and the exterior ↔ interior state machine.
//!
//! ```text
//!              enter(b)  [state = Exterior]
//!   Exterior ─────────────────────────────► Interior { b, saved }
//!      ▲                                          │
//!      └──────────────────────────────────────────┘
//!              exit()    [state = Interior]
//! ```
//!
//! The current building and the saved exterior position live in one enum
//! variant, so one can never be set without the other.

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::building::BuildingId;
use crate::geometry::{Rect, Vec2};

/// Padded proximity rect around a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionZone {
    pub rect: Rect,
    pub padding: i32,
}

impl InteractionZone {
    /// Zone around `target`, strictly larger on every side.
    pub fn around(target: &Rect, padding: i32) -> Self {
        let padding = padding.max(1);
        Self {
            rect: target.inflate(padding),
            padding,
        }
    }

    /// Follow a moved building.
    pub fn update(&mut self, target: &Rect) {
        self.rect = target.inflate(self.padding);
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.rect.intersects(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    pub building: BuildingId,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TransitionState {
    #[default]
    Exterior,
    Interior {
        building: BuildingId,
        /// Actor position just before entering.
        saved_exterior: Vec2,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Observer = Box<dyn FnMut(&TransitionEvent)>;

/// Owns the transition state and its observers.
#[derive(Default)]
pub struct TransitionManager {
    state: TransitionState,
    observers: Vec<(SubscriberId, Observer)>,
    next_subscriber: u64,
}

impl TransitionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_inside(&self) -> bool {
        matches!(self.state, TransitionState::Interior { .. })
    }

    pub fn current_interior(&self) -> Option<BuildingId> {
        match self.state {
            TransitionState::Interior { building, .. } => Some(building),
            TransitionState::Exterior => None,
        }
    }

    pub fn saved_exterior_position(&self) -> Option<Vec2> {
        match self.state {
            TransitionState::Interior { saved_exterior, .. } => Some(saved_exterior),
            TransitionState::Exterior => None,
        }
    }

    /// Observers run synchronously, in subscription order, after each
    /// state change.
    pub fn subscribe(&mut self, observer: Box<dyn FnMut(&TransitionEvent)>) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Exterior → Interior. Saves the actor's position, places it at
    /// `destination`, then notifies. Fails without effect when already
    /// inside.
    pub fn enter(&mut self, building: BuildingId, actor: &mut Actor, destination: Vec2) -> bool {
        if self.is_inside() {
            return false;
        }
        self.state = TransitionState::Interior {
            building,
            saved_exterior: actor.position(),
        };
        actor.set_position(destination.x, destination.y);
        self.notify(TransitionEvent {
            kind: TransitionKind::Enter,
            building,
        });
        true
    }

    /// Interior → Exterior. Restores the saved position, then notifies.
    pub fn exit(&mut self, actor: &mut Actor) -> Option<BuildingId> {
        let TransitionState::Interior {
            building,
            saved_exterior,
        } = self.state
        else {
            return None;
        };
        self.state = TransitionState::Exterior;
        actor.set_position(saved_exterior.x, saved_exterior.y);
        self.notify(TransitionEvent {
            kind: TransitionKind::Exit,
            building,
        });
        Some(building)
    }

    /// Drop back to Exterior without moving anyone or notifying.
    pub fn reset(&mut self) {
        self.state = TransitionState::Exterior;
    }

    fn notify(&mut self, event: TransitionEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn zone_is_strictly_larger() {
        let building = Rect::new(100, 100, 64, 64);
        let zone = InteractionZone::around(&building, 40);
        assert_eq!(zone.rect, Rect::new(60, 60, 144, 144));
        let zero = InteractionZone::around(&building, 0);
        assert_eq!(zero.rect, Rect::new(99, 99, 66, 66));
        assert!(zone.contains(&Rect::new(50, 50, 20, 20)));
        assert!(!zone.contains(&Rect::new(0, 0, 60, 60)));
    }

    #[test]
    fn zone_follows_building() {
        let mut zone = InteractionZone::around(&Rect::new(0, 0, 10, 10), 5);
        zone.update(&Rect::new(100, 0, 10, 10));
        assert_eq!(zone.rect, Rect::new(95, -5, 20, 20));
    }

    #[test]
    fn enter_then_exit_restores_position() {
        let mut tm = TransitionManager::new();
        let mut actor = Actor::new(123.5, 456.25);
        assert!(tm.enter(BuildingId(4), &mut actor, Vec2::new(400.0, 50.0)));
        assert!(tm.is_inside());
        assert_eq!(tm.current_interior(), Some(BuildingId(4)));
        assert_eq!(tm.saved_exterior_position(), Some(Vec2::new(123.5, 456.25)));
        assert_eq!(actor.position(), Vec2::new(400.0, 50.0));

        assert_eq!(tm.exit(&mut actor), Some(BuildingId(4)));
        assert_eq!(actor.position(), Vec2::new(123.5, 456.25));
        assert_eq!(tm.state(), TransitionState::Exterior);
        assert_eq!(tm.saved_exterior_position(), None);
    }

    #[test]
    fn nested_enter_and_outside_exit_fail() {
        let mut tm = TransitionManager::new();
        let mut actor = Actor::new(0.0, 0.0);
        assert_eq!(tm.exit(&mut actor), None);

        tm.enter(BuildingId(1), &mut actor, Vec2::new(10.0, 10.0));
        let before = tm.state();
        actor.set_position(20.0, 20.0);
        assert!(!tm.enter(BuildingId(2), &mut actor, Vec2::new(99.0, 99.0)));
        assert_eq!(tm.state(), before);
        assert_eq!(actor.position(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn observers_see_state_after_change_in_order() {
        let log: Rc<RefCell<Vec<(u8, TransitionEvent)>>> = Rc::default();
        let mut tm = TransitionManager::new();
        for tag in [1u8, 2] {
            let log = Rc::clone(&log);
            tm.subscribe(Box::new(move |event| log.borrow_mut().push((tag, *event))));
        }
        let mut actor = Actor::new(0.0, 0.0);
        tm.enter(BuildingId(7), &mut actor, Vec2::ZERO);
        tm.exit(&mut actor);

        let enter = TransitionEvent {
            kind: TransitionKind::Enter,
            building: BuildingId(7),
        };
        let exit = TransitionEvent {
            kind: TransitionKind::Exit,
            building: BuildingId(7),
        };
        assert_eq!(*log.borrow(), vec![(1, enter), (2, enter), (1, exit), (2, exit)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut tm = TransitionManager::new();
        let c = Rc::clone(&count);
        let id = tm.subscribe(Box::new(move |_| *c.borrow_mut() += 1));
        let mut actor = Actor::new(0.0, 0.0);
        tm.enter(BuildingId(0), &mut actor, Vec2::ZERO);
        assert!(tm.unsubscribe(id));
        assert!(!tm.unsubscribe(id));
        tm.exit(&mut actor);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(tm.subscriber_count(), 0);
    }
}
