//! The building system façade.
//!
//! [`BuildingManager`] owns every building, the transition state machine and
//! the factory that builds new entries. Per frame a caller moves the actor
//! with [`BuildingManager::move_actor`], then asks whether it can enter or
//! exit, and finally runs furniture interaction for the active interior.
//!
//! Which collision set is active is decided by the transition state alone:
//! building hitboxes outside, walls and furniture inside.

use serde::Serialize;

use crate::actor::Actor;
use crate::building::{load_layout_json, Building, BuildingFactory, BuildingId, BuildingSpec};
use crate::collision::{ColliderKey, CollisionRegistry};
use crate::constants::world::WORLD_SIZE;
use crate::error::LayoutError;
use crate::furniture::{FurnitureEntity, FurnitureId};
use crate::geometry::{Point, Rect, Size, Vec2};
use crate::interaction::{
    SubscriberId, TransitionEvent, TransitionKind, TransitionManager, TransitionState,
};
use crate::interior::{InteriorManager, NpcId};

// ── Diagnostics ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingInfo {
    pub id: BuildingId,
    pub building_type: String,
    pub position: Point,
    pub size: Size,
    pub interior_size: Option<Size>,
    pub can_enter: bool,
    pub has_interior: bool,
    pub npc_count: usize,
    pub max_npcs: usize,
    pub at_capacity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionInfo {
    pub eligible_buildings: usize,
    pub is_inside: bool,
    pub current_building: Option<BuildingId>,
    pub observers: usize,
}

/// Developer-facing snapshot. Not a stable format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub buildings_count: usize,
    pub building_types: Vec<String>,
    pub interaction: InteractionInfo,
    pub total_npcs_in_buildings: usize,
    pub buildings_at_capacity: usize,
    pub buildings: Vec<BuildingInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, category: &'static str, severity: Severity, message: String) {
        self.issues.push(ValidationIssue {
            category,
            severity,
            message,
        });
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn info(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Info)
    }

    /// No errors. Warnings are allowed.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }
}

// ── Town presets ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TownSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl TownSize {
    /// Unrecognised names fall back to `Small`.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "medium" => TownSize::Medium,
            "large" => TownSize::Large,
            _ => TownSize::Small,
        }
    }
}

/// Pre-designed building lists around a town centre.
pub fn town_layout(center_x: i32, center_y: i32, size: TownSize) -> Vec<BuildingSpec> {
    let at = |dx: i32, dy: i32, kind: &str| BuildingSpec::new(center_x + dx, center_y + dy, kind);
    match size {
        TownSize::Small => vec![
            at(-150, 100, "house"),
            at(50, 100, "shop"),
            at(-50, 200, "house").with_variant("small"),
        ],
        TownSize::Medium => vec![
            at(-200, 100, "house"),
            at(0, 100, "shop"),
            at(200, 100, "house"),
            at(-100, 250, "shop").with_shop_type("tavern"),
            at(100, 250, "house").with_variant("large"),
        ],
        TownSize::Large => vec![
            // Main street
            at(-300, 100, "house"),
            at(-150, 100, "shop"),
            at(0, 100, "shop").with_shop_type("tavern"),
            at(150, 100, "shop").with_shop_type("blacksmith"),
            at(300, 100, "house"),
            // Side streets
            at(-200, 300, "house").with_variant("large"),
            at(0, 300, "house"),
            at(200, 300, "house").with_variant("small"),
            // Back area
            at(-100, -100, "house").with_variant("large"),
            at(100, -100, "house"),
        ],
    }
}

// ── Façade ──────────────────────────────────────────────────────────────

pub struct BuildingManager {
    buildings: Vec<Building>,
    next_id: u32,
    /// Interactive buildings and their zones, in insertion order. Rebuilt
    /// wholesale whenever a building is added, removed or moved.
    eligible: Vec<(BuildingId, Rect)>,
    transitions: TransitionManager,
    factory: BuildingFactory,
    world_size: Size,
}

impl BuildingManager {
    pub fn new(factory: BuildingFactory) -> Self {
        let mut transitions = TransitionManager::new();
        transitions.subscribe(Box::new(|event: &TransitionEvent| match event.kind {
            TransitionKind::Enter => log::info!("Entered building {:?}", event.building),
            TransitionKind::Exit => log::info!("Exited building {:?}", event.building),
        }));
        Self {
            buildings: Vec::new(),
            next_id: 0,
            eligible: Vec::new(),
            transitions,
            factory,
            world_size: Size::new(WORLD_SIZE, WORLD_SIZE),
        }
    }

    /// Manager with the built-in catalog, standard assets and a seeded
    /// tile renderer.
    pub fn headless(seed: u64) -> Self {
        Self::new(BuildingFactory::headless(seed))
    }

    pub fn with_world_size(mut self, size: Size) -> Self {
        self.world_size = size;
        self
    }

    /// Parse a layout and build every entry in order.
    pub fn from_layout_json(factory: BuildingFactory, json: &str) -> Result<Self, LayoutError> {
        let specs = load_layout_json(json)?;
        let mut manager = Self::new(factory);
        manager.add_buildings(&specs);
        Ok(manager)
    }

    pub fn add_buildings(&mut self, specs: &[BuildingSpec]) -> Vec<BuildingId> {
        let ids = specs
            .iter()
            .map(|spec| {
                let id = self.allocate_id();
                self.buildings.push(self.factory.build(id, spec));
                id
            })
            .collect();
        self.rebuild_interaction_index();
        log::info!("Building system holds {} buildings", self.buildings.len());
        ids
    }

    pub fn add_building(&mut self, spec: &BuildingSpec) -> BuildingId {
        let id = self.allocate_id();
        self.buildings.push(self.factory.build(id, spec));
        self.rebuild_interaction_index();
        id
    }

    /// Remove a building. Refused while it is the current interior.
    pub fn remove_building(&mut self, id: BuildingId) -> bool {
        if self.transitions.current_interior() == Some(id) {
            log::warn!("Refusing to remove building {:?} while inside it", id);
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.buildings.remove(index);
        self.rebuild_interaction_index();
        true
    }

    pub fn move_building(&mut self, id: BuildingId, x: i32, y: i32) -> bool {
        let Some(building) = self.building_mut(id) else {
            return false;
        };
        building.update_position(x, y);
        self.rebuild_interaction_index();
        true
    }

    fn allocate_id(&mut self) -> BuildingId {
        let id = BuildingId(self.next_id);
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: BuildingId) -> Option<usize> {
        self.buildings.iter().position(|b| b.id() == id)
    }

    fn rebuild_interaction_index(&mut self) {
        self.eligible = self
            .buildings
            .iter()
            .filter(|b| b.is_interactive())
            .filter_map(|b| b.interaction_zone().map(|zone| (b.id(), zone.rect)))
            .collect();
    }

    // ── Lookups ────────────────────────────────────────────────────────

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id() == id)
    }

    pub(crate) fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.iter_mut().find(|b| b.id() == id)
    }

    pub fn factory(&self) -> &BuildingFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut BuildingFactory {
        &mut self.factory
    }

    pub fn eligible_buildings(&self) -> impl Iterator<Item = BuildingId> + '_ {
        self.eligible.iter().map(|(id, _)| *id)
    }

    pub fn find_building_by_type(&self, building_type: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.kind().key() == building_type)
    }

    pub fn find_buildings_by_type(&self, building_type: &str) -> Vec<&Building> {
        self.buildings
            .iter()
            .filter(|b| b.kind().key() == building_type)
            .collect()
    }

    pub fn get_building_at_position(&self, x: i32, y: i32) -> Option<&Building> {
        self.buildings.iter().find(|b| b.rect().contains_point(x, y))
    }

    /// Building whose rect centre is closest to `(x, y)`.
    pub fn get_nearest_building(&self, x: f32, y: f32) -> Option<&Building> {
        let origin = Vec2::new(x, y);
        let mut best: Option<(f32, &Building)> = None;
        for building in &self.buildings {
            let distance = origin.distance(&Vec2::from(building.rect().center()));
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, building));
            }
        }
        best.map(|(_, b)| b)
    }

    // ── Transitions ────────────────────────────────────────────────────

    pub fn transitions(&self) -> &TransitionManager {
        &self.transitions
    }

    pub fn subscribe(&mut self, observer: Box<dyn FnMut(&TransitionEvent)>) -> SubscriberId {
        self.transitions.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.transitions.unsubscribe(id)
    }

    pub fn is_inside_building(&self) -> bool {
        self.transitions.is_inside()
    }

    pub fn current_building(&self) -> Option<BuildingId> {
        self.transitions.current_interior()
    }

    pub fn current_interior(&self) -> Option<&InteriorManager> {
        let id = self.current_building()?;
        self.building(id)?.interior()
    }

    pub(crate) fn current_interior_mut(&mut self) -> Option<&mut InteriorManager> {
        let id = self.current_building()?;
        self.building_mut(id)?.interior_mut()
    }

    /// First eligible building whose zone the rect overlaps. `None` while
    /// inside.
    pub fn check_building_entry(&self, actor_rect: &Rect) -> Option<BuildingId> {
        if self.is_inside_building() {
            return None;
        }
        self.eligible
            .iter()
            .filter(|(_, zone)| zone.intersects(actor_rect))
            .map(|(id, _)| *id)
            .find(|id| self.building(*id).is_some_and(Building::can_enter))
    }

    /// Interior exit anchor of `id`, if the actor may enter it right now.
    fn entry_destination(&self, id: BuildingId, actor_rect: &Rect) -> Option<Vec2> {
        let building = self.building(id)?;
        if !building.is_interactive() || !building.can_enter() {
            log::debug!("Building {:?} is not enterable", id);
            return None;
        }
        if !building.check_interaction(actor_rect) {
            log::debug!("Actor out of range of building {:?}", id);
            return None;
        }
        let interior = building.interior()?;
        Some(Vec2::from(interior.exit_pos()))
    }

    pub fn enter_building(&mut self, id: BuildingId, actor: &mut Actor) -> bool {
        if self.is_inside_building() {
            log::debug!("Already inside {:?}, ignoring entry", self.current_building());
            return false;
        }
        match self.entry_destination(id, &actor.rect()) {
            Some(destination) => self.transitions.enter(id, actor, destination),
            None => false,
        }
    }

    pub fn check_building_exit(&self, actor_rect: &Rect) -> bool {
        self.current_interior()
            .is_some_and(|interior| interior.check_exit_range(actor_rect))
    }

    /// Leave the current interior. Refused while the actor is seated.
    pub fn exit_building(&mut self, actor: &mut Actor) -> bool {
        if actor.is_sitting {
            log::debug!("Actor is seated, ignoring exit");
            return false;
        }
        if !self.check_building_exit(&actor.rect()) {
            return false;
        }
        self.transitions.exit(actor).is_some()
    }

    /// One interact press: leave if standing in the exit zone, otherwise
    /// enter the first building in range.
    pub fn handle_interact(&mut self, actor: &mut Actor) -> Option<TransitionEvent> {
        if let Some(building) = self.current_building() {
            return self.exit_building(actor).then_some(TransitionEvent {
                kind: TransitionKind::Exit,
                building,
            });
        }
        let building = self.check_building_entry(&actor.rect())?;
        self.enter_building(building, actor)
            .then_some(TransitionEvent {
                kind: TransitionKind::Enter,
                building,
            })
    }

    // ── Collision ──────────────────────────────────────────────────────

    /// Walls of the current interior; empty outside.
    pub fn get_interior_collision_walls(&self) -> &[Rect] {
        match self.current_interior() {
            Some(interior) => interior.walls(),
            None => &[],
        }
    }

    /// Solids of the active space, in resolution order.
    pub fn active_collision_registry(&self) -> CollisionRegistry {
        match self.current_interior() {
            Some(interior) => interior
                .walls()
                .iter()
                .enumerate()
                .map(|(i, wall)| (ColliderKey::Wall(i), *wall))
                .chain(
                    interior
                        .furniture_collisions()
                        .into_iter()
                        .map(|(id, hitbox)| (ColliderKey::Furniture(id), hitbox)),
                )
                .collect(),
            None => self
                .buildings
                .iter()
                .filter(|b| b.is_solid())
                .map(|b| (ColliderKey::Building(b.id()), b.hitbox()))
                .collect(),
        }
    }

    /// Bounds of the active space: the world outside, the interior inside.
    pub fn active_bounds(&self) -> Rect {
        match self.current_interior() {
            Some(interior) => interior.layout().bounds(),
            None => Rect::from_size(0, 0, self.world_size),
        }
    }

    /// Apply one frame of movement: translate, clamp to the active space,
    /// then push out of every solid in turn.
    pub fn move_actor(&self, actor: &mut Actor, dx: f32, dy: f32) -> bool {
        if !actor.can_move {
            return false;
        }
        actor.translate(dx, dy);

        let bounds = self.active_bounds();
        let half_w = (actor.size().width / 2) as f32;
        let half_h = (actor.size().height / 2) as f32;
        let p = actor.position();
        let x = p
            .x
            .max(bounds.left() as f32 + half_w)
            .min(bounds.right() as f32 - half_w);
        let y = p
            .y
            .max(bounds.top() as f32 + half_h)
            .min(bounds.bottom() as f32 - half_h);
        actor.set_position(x, y);

        let resolved = self.active_collision_registry().resolve_all(&actor.rect());
        actor.follow_rect(&resolved);
        true
    }

    // ── Furniture (interior-scoped) ────────────────────────────────────

    pub fn get_interactable_furniture(&self, actor_rect: &Rect) -> Vec<&FurnitureEntity> {
        self.current_interior()
            .map(|interior| interior.get_interactable_furniture(actor_rect))
            .unwrap_or_default()
    }

    pub fn check_furniture_interaction(&self, actor_rect: &Rect) -> Option<&FurnitureEntity> {
        self.current_interior()?.check_furniture_interaction(actor_rect)
    }

    pub fn find_free_chair(&self, building: BuildingId) -> Option<FurnitureId> {
        self.building(building)?.interior()?.find_free_chair()
    }

    // ── NPC occupancy ──────────────────────────────────────────────────

    /// Admit an NPC. An NPC is inside at most one building at a time.
    pub fn npc_enter(&mut self, building: BuildingId, npc: NpcId) -> bool {
        if let Some(current) = self.building_of_npc(npc) {
            log::debug!("{:?} already inside {:?}", npc, current);
            return false;
        }
        self.building_mut(building)
            .is_some_and(|b| b.add_npc(npc))
    }

    pub fn npc_leave(&mut self, building: BuildingId, npc: NpcId) -> bool {
        self.building_mut(building)
            .is_some_and(|b| b.remove_npc(npc))
    }

    pub fn building_of_npc(&self, npc: NpcId) -> Option<BuildingId> {
        self.buildings
            .iter()
            .find(|b| b.contains_npc(npc))
            .map(Building::id)
    }

    // ── Diagnostics ────────────────────────────────────────────────────

    pub fn get_building_info(&self) -> Vec<BuildingInfo> {
        self.buildings
            .iter()
            .map(|b| BuildingInfo {
                id: b.id(),
                building_type: b.kind().key().to_string(),
                position: b.position(),
                size: b.rect().size(),
                interior_size: b.interior().map(|i| i.layout().interior_size),
                can_enter: b.can_enter(),
                has_interior: b.has_interior(),
                npc_count: b.get_npc_count(),
                max_npcs: b.max_npcs(),
                at_capacity: b.is_at_capacity(),
            })
            .collect()
    }

    pub fn get_system_info(&self) -> SystemInfo {
        SystemInfo {
            buildings_count: self.buildings.len(),
            building_types: self
                .buildings
                .iter()
                .map(|b| b.kind().key().to_string())
                .collect(),
            interaction: InteractionInfo {
                eligible_buildings: self.eligible.len(),
                is_inside: self.is_inside_building(),
                current_building: self.current_building(),
                observers: self.transitions.subscriber_count(),
            },
            total_npcs_in_buildings: self.buildings.iter().map(Building::get_npc_count).sum(),
            buildings_at_capacity: self.buildings.iter().filter(|b| b.is_at_capacity()).count(),
            buildings: self.get_building_info(),
        }
    }

    pub fn validate_system(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (i, a) in self.buildings.iter().enumerate() {
            for b in &self.buildings[i + 1..] {
                if a.rect().intersects(&b.rect()) {
                    report.push(
                        "overlap",
                        Severity::Warning,
                        format!(
                            "Buildings {:?} ({}) at {:?} and {:?} ({}) at {:?} overlap",
                            a.id(),
                            a.kind(),
                            a.rect(),
                            b.id(),
                            b.kind(),
                            b.rect()
                        ),
                    );
                }
            }
        }

        for b in &self.buildings {
            if b.config().flags.has_interior != b.has_interior() {
                report.push(
                    "structure",
                    Severity::Error,
                    format!("Building {:?} ({}) interior does not match its policy", b.id(), b.kind()),
                );
            }
            if b.interior().is_some_and(|i| !i.is_initialized()) {
                report.push(
                    "structure",
                    Severity::Error,
                    format!("Building {:?} ({}) interior was never initialized", b.id(), b.kind()),
                );
            }
            if b.is_interactive() && b.interaction_zone().is_none() {
                report.push(
                    "structure",
                    Severity::Error,
                    format!("Interactive building {:?} ({}) has no interaction zone", b.id(), b.kind()),
                );
            }
            if !b.has_interior() && b.get_npc_count() > 0 {
                report.push(
                    "occupancy",
                    Severity::Warning,
                    format!("Building {:?} ({}) has no interior but contains NPCs", b.id(), b.kind()),
                );
            }
        }

        if let TransitionState::Interior { building, .. } = self.transitions.state() {
            if self.building(building).and_then(Building::interior).is_none() {
                report.push(
                    "transition",
                    Severity::Error,
                    format!("Current interior {:?} does not exist", building),
                );
            }
        }

        let capacity: usize = self.buildings.iter().map(Building::max_npcs).sum();
        let npcs: usize = self.buildings.iter().map(Building::get_npc_count).sum();
        report.push("capacity", Severity::Info, format!("Total building capacity: {}", capacity));
        report.push("capacity", Severity::Info, format!("Total NPCs in buildings: {}", npcs));
        let utilization = if capacity == 0 {
            "System utilization: n/a".to_string()
        } else {
            format!("System utilization: {:.1}%", npcs as f64 / capacity as f64 * 100.0)
        };
        report.push("capacity", Severity::Info, utilization);

        report
    }

    /// Back to the exterior with every interior emptied and every seat
    /// freed.
    pub fn cleanup(&mut self) {
        self.transitions.reset();
        for building in &mut self.buildings {
            if let Some(interior) = building.interior_mut() {
                interior.clear_occupants();
                interior.release_furniture();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> BuildingManager {
        let mut m = BuildingManager::headless(11);
        m.add_buildings(&[
            BuildingSpec::new(100, 100, "house").with_furniture(200, 200, "chair"),
            BuildingSpec::new(400, 100, "fountain"),
            BuildingSpec::new(700, 100, "shop"),
        ]);
        m
    }

    /// Actor standing just below a building, inside its zone.
    fn actor_below(m: &BuildingManager, id: BuildingId) -> Actor {
        let rect = m.building(id).unwrap().rect();
        Actor::new(rect.center_x() as f32, (rect.bottom() + 20) as f32)
    }

    #[test]
    fn decorative_buildings_are_not_eligible() {
        let m = manager();
        let eligible: Vec<_> = m.eligible_buildings().collect();
        assert_eq!(eligible, vec![BuildingId(0), BuildingId(2)]);
        assert_eq!(m.active_collision_registry().len(), 3);
    }

    #[test]
    fn enter_and_exit_round_trip() {
        let mut m = manager();
        let mut actor = actor_below(&m, BuildingId(0));
        let start = actor.position();

        assert_eq!(m.check_building_entry(&actor.rect()), Some(BuildingId(0)));
        assert!(m.enter_building(BuildingId(0), &mut actor));
        assert!(m.is_inside_building());
        assert_eq!(actor.position(), Vec2::new(400.0, 50.0));
        assert_eq!(m.get_interior_collision_walls().len(), 5);
        assert_eq!(m.check_building_entry(&actor.rect()), None);

        assert!(!m.enter_building(BuildingId(2), &mut actor));
        assert_eq!(m.current_building(), Some(BuildingId(0)));

        assert!(m.check_building_exit(&actor.rect()));
        assert!(m.exit_building(&mut actor));
        assert_eq!(actor.position(), start);
        assert!(m.get_interior_collision_walls().is_empty());
        assert!(!m.exit_building(&mut actor));
    }

    #[test]
    fn entry_requires_zone_overlap() {
        let mut m = manager();
        let mut far = Actor::new(1500.0, 1500.0);
        assert!(!m.enter_building(BuildingId(0), &mut far));
        assert!(!m.is_inside_building());
        assert_eq!(far.position(), Vec2::new(1500.0, 1500.0));

        let mut near_fountain = actor_below(&m, BuildingId(1));
        assert!(!m.enter_building(BuildingId(1), &mut near_fountain));
    }

    #[test]
    fn exit_requires_exit_zone() {
        let mut m = manager();
        let mut actor = actor_below(&m, BuildingId(0));
        m.enter_building(BuildingId(0), &mut actor);
        actor.set_position(400.0, 400.0);
        assert!(!m.exit_building(&mut actor));
        assert!(m.is_inside_building());
    }

    #[test]
    fn handle_interact_toggles() {
        let mut m = manager();
        let mut actor = actor_below(&m, BuildingId(2));
        let event = m.handle_interact(&mut actor).unwrap();
        assert_eq!(event.kind, TransitionKind::Enter);
        assert_eq!(event.building, BuildingId(2));
        let event = m.handle_interact(&mut actor).unwrap();
        assert_eq!(event.kind, TransitionKind::Exit);
        assert_eq!(m.handle_interact(&mut Actor::new(2000.0, 2000.0)), None);
    }

    #[test]
    fn movement_is_blocked_by_hitboxes() {
        let m = manager();
        // House hitbox is (110,105,108,118) for a 128x128 sprite
        let mut actor = Actor::new(90.0, 160.0);
        assert!(m.move_actor(&mut actor, 10.0, 0.0));
        assert!(!actor.rect().intersects(&m.building(BuildingId(0)).unwrap().hitbox()));
        assert_eq!(actor.rect().right(), 110);
    }

    #[test]
    fn movement_clamps_and_respects_can_move() {
        let m = manager();
        let mut actor = Actor::new(20.0, 20.0);
        m.move_actor(&mut actor, -100.0, -100.0);
        assert_eq!(actor.position(), Vec2::new(16.0, 16.0));

        actor.can_move = false;
        assert!(!m.move_actor(&mut actor, 50.0, 0.0));
        assert_eq!(actor.position(), Vec2::new(16.0, 16.0));
    }

    #[test]
    fn interior_walls_block_movement() {
        let mut m = manager();
        let mut actor = actor_below(&m, BuildingId(0));
        m.enter_building(BuildingId(0), &mut actor);
        actor.set_position(40.0, 300.0);
        m.move_actor(&mut actor, -30.0, 0.0);
        assert_eq!(actor.rect().left(), 20);
    }

    #[test]
    fn remove_refused_while_inside() {
        let mut m = manager();
        let mut actor = actor_below(&m, BuildingId(0));
        m.enter_building(BuildingId(0), &mut actor);
        assert!(!m.remove_building(BuildingId(0)));
        assert!(m.remove_building(BuildingId(2)));
        assert!(!m.remove_building(BuildingId(2)));
        assert_eq!(m.eligible_buildings().collect::<Vec<_>>(), vec![BuildingId(0)]);
    }

    #[test]
    fn moving_building_rebuilds_zones() {
        let mut m = manager();
        let old_spot = actor_below(&m, BuildingId(0));
        assert!(m.move_building(BuildingId(0), 1000, 1000));
        assert_eq!(m.check_building_entry(&old_spot.rect()), None);
        let new_spot = actor_below(&m, BuildingId(0));
        assert_eq!(m.check_building_entry(&new_spot.rect()), Some(BuildingId(0)));
    }

    #[test]
    fn npc_lives_in_one_building() {
        let mut m = manager();
        assert!(m.npc_enter(BuildingId(0), NpcId(1)));
        assert!(!m.npc_enter(BuildingId(2), NpcId(1)));
        assert!(!m.npc_enter(BuildingId(1), NpcId(2)));
        assert_eq!(m.building_of_npc(NpcId(1)), Some(BuildingId(0)));
        assert!(m.npc_leave(BuildingId(0), NpcId(1)));
        assert!(m.npc_enter(BuildingId(2), NpcId(1)));
    }

    #[test]
    fn furniture_only_outside_is_empty() {
        let mut m = manager();
        let mut actor = actor_below(&m, BuildingId(0));
        assert!(m.get_interactable_furniture(&Rect::new(200, 200, 10, 10)).is_empty());
        m.enter_building(BuildingId(0), &mut actor);
        assert_eq!(m.get_interactable_furniture(&Rect::new(200, 200, 10, 10)).len(), 1);
        assert!(m.check_furniture_interaction(&Rect::new(200, 200, 10, 10)).is_some());
        assert_eq!(m.find_free_chair(BuildingId(0)), Some(FurnitureId(0)));
        assert_eq!(m.find_free_chair(BuildingId(1)), None);
    }

    #[test]
    fn lookups() {
        let m = manager();
        assert_eq!(m.find_building_by_type("shop").map(Building::id), Some(BuildingId(2)));
        assert_eq!(m.find_buildings_by_type("house").len(), 1);
        assert_eq!(m.get_building_at_position(410, 110).map(Building::id), Some(BuildingId(1)));
        assert!(m.get_building_at_position(0, 0).is_none());
        assert_eq!(m.get_nearest_building(690.0, 90.0).map(Building::id), Some(BuildingId(2)));
    }

    #[test]
    fn diagnostics_and_cleanup() {
        let mut m = manager();
        m.npc_enter(BuildingId(0), NpcId(1));
        let info = m.get_system_info();
        assert_eq!(info.buildings_count, 3);
        assert_eq!(info.building_types, vec!["house", "fountain", "shop"]);
        assert_eq!(info.total_npcs_in_buildings, 1);
        // The fountain has no interior so it always reads as full
        assert_eq!(info.buildings_at_capacity, 1);
        assert!(serde_json::to_string(&info).is_ok());

        let report = m.validate_system();
        assert!(report.is_ok());
        assert_eq!(report.info().count(), 3);
        assert!(report
            .info()
            .any(|i| i.message == "Total building capacity: 7"));

        let mut actor = actor_below(&m, BuildingId(0));
        m.enter_building(BuildingId(0), &mut actor);
        m.cleanup();
        assert!(!m.is_inside_building());
        assert_eq!(m.get_system_info().total_npcs_in_buildings, 0);
    }

    #[test]
    fn entry_needs_can_enter_and_an_interior() {
        use crate::config::ConfigOverrides;

        let locked = ConfigOverrides {
            can_enter: Some(false),
            ..ConfigOverrides::default()
        };
        let hollow = ConfigOverrides {
            has_interior: Some(false),
            ..ConfigOverrides::default()
        };
        for overrides in [locked, hollow] {
            let mut m = BuildingManager::headless(5);
            let id = m.add_building(&BuildingSpec::new(100, 100, "gatehouse").with_custom_config(overrides));
            let building = m.building(id).unwrap();
            assert!(building.is_interactive());
            assert!(!building.can_enter());

            let mut actor = actor_below(&m, id);
            let start = actor.position();
            assert!(building.check_interaction(&actor.rect()));
            assert_eq!(m.check_building_entry(&actor.rect()), None);
            assert!(!m.enter_building(id, &mut actor));
            assert_eq!(m.handle_interact(&mut actor), None);
            assert_eq!(m.transitions().state(), TransitionState::Exterior);
            assert_eq!(actor.position(), start);
        }
    }

    /// House whose only chair sits on top of the exit zone.
    fn house_with_chair_at_exit() -> (BuildingManager, Actor) {
        let mut m = BuildingManager::headless(9);
        let id = m.add_building(&BuildingSpec::new(100, 100, "house").with_furniture(350, 20, "chair"));
        let mut actor = actor_below(&m, id);
        assert!(m.enter_building(id, &mut actor));
        (m, actor)
    }

    #[test]
    fn seated_actor_cannot_leave() {
        use crate::actor::InputState;
        use crate::constants::furniture::INTERACTION_COOLDOWN_FRAMES;
        use crate::furniture::{FurnitureAction, FurnitureInteractionController};

        let (mut m, mut actor) = house_with_chair_at_exit();
        let mut controller = FurnitureInteractionController::new();
        assert_eq!(
            controller.update(&mut m, &mut actor, InputState::INTERACT),
            Some(FurnitureAction::Sat(FurnitureId(0)))
        );
        assert_eq!(actor.position(), Vec2::new(382.0, 32.0));
        assert!(m.check_building_exit(&actor.rect()));

        assert_eq!(m.handle_interact(&mut actor), None);
        assert!(!m.exit_building(&mut actor));
        assert_eq!(m.current_building(), Some(BuildingId(0)));

        for _ in 0..INTERACTION_COOLDOWN_FRAMES {
            controller.update(&mut m, &mut actor, InputState::IDLE);
        }
        assert_eq!(
            controller.update(&mut m, &mut actor, InputState::INTERACT),
            Some(FurnitureAction::Stood(FurnitureId(0)))
        );
        let event = m.handle_interact(&mut actor).unwrap();
        assert_eq!(event.kind, TransitionKind::Exit);
        assert!(actor.can_move);
        assert!(!actor.is_sitting);
        assert!(m.move_actor(&mut actor, 5.0, 0.0));
    }

    #[test]
    fn cleanup_while_seated_frees_chair_and_actor() {
        use crate::actor::InputState;
        use crate::furniture::{FurnitureAction, FurnitureInteractionController};

        let (mut m, mut actor) = house_with_chair_at_exit();
        let mut controller = FurnitureInteractionController::new();
        controller.update(&mut m, &mut actor, InputState::INTERACT);
        assert_eq!(m.find_free_chair(BuildingId(0)), None);

        m.cleanup();
        assert!(!m.is_inside_building());
        assert_eq!(m.find_free_chair(BuildingId(0)), Some(FurnitureId(0)));
        assert!(m
            .building(BuildingId(0))
            .and_then(Building::interior)
            .unwrap()
            .furniture()
            .iter()
            .all(|f| !f.is_occupied));

        // First frame outside releases the actor in place
        let seat = actor.position();
        assert_eq!(
            controller.update(&mut m, &mut actor, InputState::IDLE),
            Some(FurnitureAction::Stood(FurnitureId(0)))
        );
        assert_eq!(controller.current_interaction(), None);
        assert_eq!(actor.position(), seat);
        assert!(actor.can_move);
        assert!(!actor.is_sitting);
        assert!(m.move_actor(&mut actor, 5.0, 0.0));
    }

    #[test]
    fn overlapping_buildings_warn() {
        let mut m = BuildingManager::headless(0);
        m.add_buildings(&[BuildingSpec::new(0, 0, "house"), BuildingSpec::new(50, 50, "house")]);
        let report = m.validate_system();
        assert!(report.is_ok());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn town_presets() {
        assert_eq!(town_layout(0, 0, TownSize::Small).len(), 3);
        assert_eq!(town_layout(0, 0, TownSize::Medium).len(), 5);
        let large = town_layout(1000, 1000, TownSize::Large);
        assert_eq!(large.len(), 10);
        assert_eq!(large[3].shop_type.as_deref(), Some("blacksmith"));
        assert_eq!((large[8].x, large[8].y), (900, 900));
        assert_eq!(TownSize::parse("huge"), TownSize::Small);
    }
}
