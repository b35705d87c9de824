//! NeuroSim Headless Building-System Harness
//!
//! Validates the spatial core and the bundled town data without a window.
//! Runs entirely in-process: no renderer, no input device, no frame loop.
//!
//! Usage:
//!   cargo run -p neurosim-simtest
//!   cargo run -p neurosim-simtest -- --verbose
//!   cargo run -p neurosim-simtest -- --dump-info
//!
//! Library log output is controlled with `RUST_LOG` (default `neurosim=info`).

use neurosim_logic::actor::{Actor, InputState};
use neurosim_logic::assets::AssetCatalog;
use neurosim_logic::building::{load_layout_json, BuildingFactory, BuildingId, BuildingSpec};
use neurosim_logic::config::BuildingCatalog;
use neurosim_logic::constants::furniture::INTERACTION_COOLDOWN_FRAMES;
use neurosim_logic::doors::DoorTriggerSystem;
use neurosim_logic::furniture::{FurnitureAction, FurnitureInteractionController};
use neurosim_logic::geometry::{Rect, Size, Vec2};
use neurosim_logic::interior::{NpcId, TilePaletteRenderer};
use neurosim_logic::manager::{town_layout, BuildingManager, TownSize};

// ── Town layout (same JSON the integration tests use) ───────────────────
const LAYOUT_JSON: &str = include_str!("../../../data/town_layout.json");

const SEED: u64 = 42;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("neurosim=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    let dump_info = std::env::args().any(|a| a == "--dump-info");
    println!("=== NeuroSim Building System Harness ===\n");

    let mut results = Vec::new();

    // 1. Layout data validation
    results.extend(validate_layout_data(verbose));

    // 2. Building policies and geometry
    results.extend(validate_building_policies(verbose));

    // 3. Interior wall rings
    results.extend(validate_interior_layouts(verbose));

    // 4. Exterior ↔ interior transitions
    results.extend(validate_transitions(verbose));

    // 5. NPC occupancy sweep
    results.extend(validate_occupancy(verbose));

    // 6. Furniture session
    results.extend(validate_furniture(verbose));

    // 7. Door trigger system
    results.extend(validate_door_triggers(verbose));

    // 8. Town presets
    results.extend(validate_town_presets(verbose));

    if dump_info {
        if let Some(manager) = load_town() {
            match serde_json::to_string_pretty(&manager.get_system_info()) {
                Ok(json) => println!("\n--- System Info ---\n{}", json),
                Err(e) => println!("\n--- System Info ---\nserialization failed: {}", e),
            }
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_town() -> Option<BuildingManager> {
    match BuildingManager::from_layout_json(BuildingFactory::headless(SEED), LAYOUT_JSON) {
        Ok(manager) => Some(manager),
        Err(e) => {
            tracing::error!("Town layout failed to load: {}", e);
            None
        }
    }
}

/// Actor just below a building's sprite, inside its entry zone.
fn actor_in_front_of(manager: &BuildingManager, id: BuildingId) -> Option<Actor> {
    let rect = manager.building(id)?.rect();
    Some(Actor::new(rect.center_x() as f32, (rect.bottom() + 20) as f32))
}

fn load_failure(name: &str) -> Vec<TestResult> {
    vec![TestResult {
        name: name.into(),
        passed: false,
        detail: "town layout did not load".into(),
    }]
}

// ── 1. Layout data ──────────────────────────────────────────────────────

fn validate_layout_data(verbose: bool) -> Vec<TestResult> {
    println!("--- Layout Data ---");
    let mut results = Vec::new();

    let specs = match load_layout_json(LAYOUT_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "layout_parse".into(),
                passed: false,
                detail: format!("layout error: {}", e),
            });
            return results;
        }
    };
    tracing::info!(buildings = specs.len(), "Loaded town layout");

    results.push(TestResult {
        name: "layout_not_empty".into(),
        passed: specs.len() >= 5,
        detail: format!("{} building entries", specs.len()),
    });

    let furniture: usize = specs.iter().map(|s| s.furniture.len()).sum();
    results.push(TestResult {
        name: "layout_has_furniture".into(),
        passed: furniture > 0,
        detail: format!("{} furniture entries", furniture),
    });

    let Some(manager) = load_town() else {
        results.extend(load_failure("layout_build"));
        return results;
    };
    let report = manager.validate_system();
    let errors: Vec<_> = report.errors().map(|i| i.message.as_str()).collect();
    let warnings = report.warnings().count();
    results.push(TestResult {
        name: "layout_validates".into(),
        passed: errors.is_empty() && warnings == 0,
        detail: if errors.is_empty() {
            format!("no errors, {} warnings", warnings)
        } else {
            errors.join("; ")
        },
    });

    if verbose {
        for issue in report.info() {
            println!("    {}", issue.message);
        }
    }

    results
}

// ── 2. Building policies ────────────────────────────────────────────────

fn validate_building_policies(verbose: bool) -> Vec<TestResult> {
    println!("--- Building Policies ---");
    let mut results = Vec::new();

    let assets = AssetCatalog::standard().with_sprite("house", Size::new(64, 64));
    let mut factory = BuildingFactory::new(
        BuildingCatalog::new(),
        assets,
        Box::new(TilePaletteRenderer::new(SEED)),
    );
    let house = factory.build(BuildingId(0), &BuildingSpec::new(100, 100, "house"));
    results.push(TestResult {
        name: "house_hitbox_padding".into(),
        passed: house.hitbox() == Rect::new(110, 105, 44, 54),
        detail: format!("hitbox {:?}", house.hitbox()),
    });

    let rect = house.rect();
    let zone_ok = house.interaction_zone().is_some_and(|z| {
        z.rect.intersects(&rect) && z.rect.width > rect.width && z.rect.height > rect.height
    });
    results.push(TestResult {
        name: "zone_larger_than_building".into(),
        passed: zone_ok,
        detail: format!("zone {:?}", house.interaction_zone().map(|z| z.rect)),
    });

    let unknown = factory.build(BuildingId(1), &BuildingSpec::new(0, 0, "observatory"));
    results.push(TestResult {
        name: "unknown_type_default_policy".into(),
        passed: unknown.can_enter() && unknown.max_npcs() == 3,
        detail: format!("{} → max_npcs {}", unknown.kind(), unknown.max_npcs()),
    });

    let fountain = factory.build(BuildingId(2), &BuildingSpec::new(0, 0, "fountain"));
    let closed = !fountain.can_npc_enter()
        && fountain.get_npc_count() == 0
        && fountain.is_at_capacity()
        && fountain.interaction_zone().is_none();
    results.push(TestResult {
        name: "decorative_building_closed".into(),
        passed: closed,
        detail: format!("fountain rect {:?}", fountain.rect()),
    });

    if verbose {
        for b in [&house, &unknown, &fountain] {
            println!("    {} rect={:?} hitbox={:?}", b.kind(), b.rect(), b.hitbox());
        }
    }

    results
}

// ── 3. Interior layouts ─────────────────────────────────────────────────

fn validate_interior_layouts(verbose: bool) -> Vec<TestResult> {
    println!("--- Interior Layouts ---");
    let mut results = Vec::new();
    let Some(manager) = load_town() else {
        return load_failure("interior_load");
    };

    let mut bad = Vec::new();
    for b in manager.buildings() {
        let Some(interior) = b.interior() else {
            continue;
        };
        let layout = interior.layout();
        let walls = layout.generate_walls();
        let (w, h) = (layout.interior_size.width, layout.interior_size.height);
        let t = layout.wall_thickness.clamp(0, w.min(h) / 2);
        let (gap_start, gap_end) = layout.door_gap();

        let overlapping = walls
            .iter()
            .enumerate()
            .any(|(i, a)| walls[i + 1..].iter().any(|c| a.intersects(c)));
        let wall_area: i64 = walls.iter().map(Rect::area).sum();
        let ring = w as i64 * h as i64 - (w - 2 * t) as i64 * (h - 2 * t) as i64;
        let gap_area = (gap_end - gap_start) as i64 * t as i64;
        let deterministic = walls == layout.generate_walls() && walls.as_slice() == interior.walls();

        if overlapping || wall_area + gap_area != ring || !deterministic {
            bad.push(format!("{} ({:?})", b.kind(), b.id()));
        }
        if verbose {
            println!(
                "    {} {}×{} walls={} door=[{}, {})",
                b.kind(),
                w,
                h,
                walls.len(),
                gap_start,
                gap_end
            );
        }
    }
    results.push(TestResult {
        name: "walls_tile_perimeter".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            "every ring tiled exactly once".into()
        } else {
            format!("bad rings: {}", bad.join(", "))
        },
    });

    results
}

// ── 4. Transitions ──────────────────────────────────────────────────────

fn validate_transitions(verbose: bool) -> Vec<TestResult> {
    println!("--- Transitions ---");
    let mut results = Vec::new();
    let Some(mut manager) = load_town() else {
        return load_failure("transitions_load");
    };

    let ids: Vec<BuildingId> = manager
        .buildings()
        .iter()
        .filter(|b| b.can_enter())
        .map(|b| b.id())
        .collect();

    let mut failures = Vec::new();
    for id in &ids {
        let Some(mut actor) = actor_in_front_of(&manager, *id) else {
            continue;
        };
        let start = actor.position();
        let entered = manager.enter_building(*id, &mut actor);
        let nested_refused = !manager.enter_building(*id, &mut actor);
        let walls = manager.get_interior_collision_walls().len();
        let exited = manager.exit_building(&mut actor);
        let restored = actor.position().distance(&start) < 0.5;
        if !(entered && nested_refused && exited && restored && walls > 0) {
            failures.push(format!("{:?}", id));
        }
        if verbose {
            println!(
                "    {:?}: entered={} walls={} exited={} restored={}",
                id, entered, walls, exited, restored
            );
        }
    }
    results.push(TestResult {
        name: "enter_exit_round_trip".into(),
        passed: failures.is_empty() && !ids.is_empty(),
        detail: format!("{} enterable buildings, failures: {:?}", ids.len(), failures),
    });

    let mut stranger = Actor::new(10.0, 10.0);
    let refused = !manager.exit_building(&mut stranger)
        && manager.handle_interact(&mut stranger).is_none()
        && stranger.position() == Vec2::new(10.0, 10.0);
    results.push(TestResult {
        name: "invalid_transitions_are_noops".into(),
        passed: refused && !manager.is_inside_building(),
        detail: "exit-while-outside and out-of-range interact ignored".into(),
    });

    results
}

// ── 5. Occupancy ────────────────────────────────────────────────────────

fn validate_occupancy(verbose: bool) -> Vec<TestResult> {
    println!("--- Occupancy ---");
    let mut results = Vec::new();
    let Some(mut manager) = load_town() else {
        return load_failure("occupancy_load");
    };

    // Pseudo-random but fixed churn over every building
    let ids: Vec<BuildingId> = manager.buildings().iter().map(|b| b.id()).collect();
    let mut violations = 0;
    for step in 0u32..500 {
        let building = ids[(step as usize * 7) % ids.len()];
        let npc = NpcId((step * 13) % 40);
        if step % 3 == 0 {
            manager.npc_leave(building, npc);
        } else {
            manager.npc_enter(building, npc);
        }
        violations += manager
            .buildings()
            .iter()
            .filter(|b| b.get_npc_count() > b.max_npcs() || (!b.has_interior() && b.can_npc_enter()))
            .count();
    }
    let info = manager.get_system_info();
    results.push(TestResult {
        name: "occupancy_within_capacity".into(),
        passed: violations == 0,
        detail: format!(
            "{} NPCs inside, {} buildings full, {} violations",
            info.total_npcs_in_buildings, info.buildings_at_capacity, violations
        ),
    });

    if verbose {
        for b in &info.buildings {
            println!("    {} {}/{}", b.building_type, b.npc_count, b.max_npcs);
        }
    }

    manager.cleanup();
    results.push(TestResult {
        name: "cleanup_empties_buildings".into(),
        passed: manager.get_system_info().total_npcs_in_buildings == 0,
        detail: "all occupant sets cleared".into(),
    });

    results
}

// ── 6. Furniture ────────────────────────────────────────────────────────

fn validate_furniture(verbose: bool) -> Vec<TestResult> {
    println!("--- Furniture ---");
    let mut results = Vec::new();
    let Some(mut manager) = load_town() else {
        return load_failure("furniture_load");
    };

    let Some((house, chair)) = manager.buildings().iter().find_map(|b| {
        let chair = b.interior()?.find_free_chair()?;
        Some((b.id(), chair))
    }) else {
        return vec![TestResult {
            name: "furniture_chair_present".into(),
            passed: false,
            detail: "no building has a chair".into(),
        }];
    };

    let mut controller = FurnitureInteractionController::new();
    let Some(mut actor) = actor_in_front_of(&manager, house) else {
        return load_failure("furniture_actor");
    };
    let outside_prompt = controller.get_interaction_prompt(&manager, &actor);
    manager.enter_building(house, &mut actor);

    let chair_rect = manager
        .current_interior()
        .and_then(|i| i.furniture_by_id(chair))
        .map(|f| f.rect);
    if let Some(rect) = chair_rect {
        // Stand just below the chair, inside its interaction margin
        actor.set_position(rect.center_x() as f32, (rect.bottom() + 12) as f32);
    }

    let sat = controller.update(&mut manager, &mut actor, InputState::INTERACT);
    let locked = !manager.move_actor(&mut actor, 5.0, 0.0);
    let mut swallowed = 0;
    for _ in 0..INTERACTION_COOLDOWN_FRAMES {
        if controller
            .update(&mut manager, &mut actor, InputState::INTERACT)
            .is_none()
        {
            swallowed += 1;
        }
    }
    let stood = controller.update(&mut manager, &mut actor, InputState::INTERACT);

    results.push(TestResult {
        name: "furniture_exterior_scoped".into(),
        passed: outside_prompt.is_none(),
        detail: "no prompt while outside".into(),
    });
    results.push(TestResult {
        name: "furniture_sit_locks_movement".into(),
        passed: sat == Some(FurnitureAction::Sat(chair)) && locked,
        detail: format!("{:?}, locked={}", sat, locked),
    });
    results.push(TestResult {
        name: "furniture_cooldown".into(),
        passed: swallowed == INTERACTION_COOLDOWN_FRAMES,
        detail: format!("{} of {} frames swallowed", swallowed, INTERACTION_COOLDOWN_FRAMES),
    });
    results.push(TestResult {
        name: "furniture_stand_up".into(),
        passed: stood == Some(FurnitureAction::Stood(chair)) && actor.can_move,
        detail: format!("{:?} at {:?}", stood, actor.position()),
    });

    if verbose {
        println!("    chair {:?} in {:?} at {:?}", chair, house, chair_rect);
    }

    results
}

// ── 7. Door triggers ────────────────────────────────────────────────────

fn validate_door_triggers(verbose: bool) -> Vec<TestResult> {
    println!("--- Door Triggers ---");
    let mut results = Vec::new();
    let Some(manager) = load_town() else {
        return load_failure("doors_load");
    };

    let mut doors = DoorTriggerSystem::new();
    doors.register_defaults(manager.buildings());

    let mut reachable = 0;
    let mut enterable = 0;
    for b in manager.buildings().iter().filter(|b| b.can_enter()) {
        enterable += 1;
        let Some(door) = doors.door(b.id()) else {
            continue;
        };
        // Approach from well outside the door
        let probe = Rect::from_center(door.rect.center_x(), door.rect.bottom() + 20, 32, 32);
        if doors.check_door_interaction(&probe, manager.buildings()) == Some(b.id()) {
            reachable += 1;
        }
        if verbose {
            println!("    {:?} door at {:?}", b.id(), door.rect);
        }
    }
    results.push(TestResult {
        name: "doors_registered".into(),
        passed: doors.len() == manager.buildings().len(),
        detail: format!("{} doors", doors.len()),
    });
    results.push(TestResult {
        name: "doors_reachable_from_outside".into(),
        passed: reachable == enterable,
        detail: format!("{}/{} enterable buildings reachable", reachable, enterable),
    });

    results
}

// ── 8. Town presets ─────────────────────────────────────────────────────

fn validate_town_presets(verbose: bool) -> Vec<TestResult> {
    println!("--- Town Presets ---");
    let mut results = Vec::new();

    for size in [TownSize::Small, TownSize::Medium, TownSize::Large] {
        let specs = town_layout(1500, 1500, size);
        let mut manager = BuildingManager::headless(SEED);
        manager.add_buildings(&specs);
        let report = manager.validate_system();
        let info = manager.get_system_info();
        results.push(TestResult {
            name: format!("town_{:?}", size).to_lowercase(),
            passed: report.is_ok() && info.buildings_count == specs.len(),
            detail: format!(
                "{} buildings, {} warnings",
                info.buildings_count,
                report.warnings().count()
            ),
        });
        if verbose {
            for w in report.warnings() {
                println!("    {}", w.message);
            }
        }
    }

    results
}
