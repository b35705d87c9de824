//! Pure spatial logic for NeuroSim.
//!
//! This crate holds the part of the game that decides where things are and
//! who may go where: solid collision, building interiors, NPC occupancy,
//! the exterior/interior transition state machine and furniture. It owns no
//! window, renderer or input device. Functions take plain data and return
//! results, so the whole system runs headless under tests and the simtest
//! harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actor`] | Moving body: position, derived rect, facing, sit state |
//! | [`assets`] | Sprite sizes per type key and the interior floor palette |
//! | [`building`] | Buildings, declarative specs and the factory |
//! | [`collision`] | Overlap test, push-out and the ordered collision registry |
//! | [`config`] | Building kinds, type policies, variants, custom catalog |
//! | [`constants`] | Layout offsets, cooldowns, fallback sizes |
//! | [`doors`] | Oriented per-door triggers (alternate entry mechanism) |
//! | [`error`] | Layout parsing errors |
//! | [`furniture`] | Furniture entities, sit/stand, interaction controller |
//! | [`geometry`] | `Rect`, `Vec2`, `Size`, `Padding` |
//! | [`interaction`] | Entry zones and the transition state machine |
//! | [`interior`] | Interior layout, occupancy and background rendering seam |
//! | [`manager`] | `BuildingManager` façade, diagnostics, town presets |
//!
//! # Example
//!
//! ```
//! use neurosim_logic::actor::Actor;
//! use neurosim_logic::building::BuildingSpec;
//! use neurosim_logic::manager::BuildingManager;
//!
//! let mut world = BuildingManager::headless(1);
//! let house = world.add_building(&BuildingSpec::new(100, 100, "house"));
//!
//! // Stand just below the front of the house
//! let mut player = Actor::new(164.0, 250.0);
//! assert!(world.enter_building(house, &mut player));
//! assert!(world.is_inside_building());
//!
//! // Entering put the player on the exit anchor, so leaving works at once
//! assert!(world.exit_building(&mut player));
//! assert_eq!(player.position().y, 250.0);
//! ```

pub mod actor;
pub mod assets;
pub mod building;
pub mod collision;
pub mod config;
pub mod constants;
pub mod doors;
pub mod error;
pub mod furniture;
pub mod geometry;
pub mod interaction;
pub mod interior;
pub mod manager;
