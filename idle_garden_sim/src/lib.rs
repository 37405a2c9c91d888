// idle_garden_sim: pure Rust simulation library for the idle garden.
//
// This crate contains all simulation logic for the garden: plant lifecycles,
// the soil fertility grid, the resource ledger, autonomous automations
// (harvester, planter, seller), and save/load reconstruction. It has no
// rendering, audio, window or file-I/O dependency and can be tested,
// benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:        Top-level SimState, tick loop, player actions, automation policies.
// - `plant.rs`:      Plant entity, stage machine, visual frame advance.
// - `automation.rs`: Automation entity, role state, movement and animation.
// - `soil.rs`:       Dense fertility grid over the garden rectangle.
// - `ledger.rs`:     Cash, score, seed/harvest/fertilizer stacks, guarded mutators.
// - `save.rs`:       Flat save format and the two-phase load pipeline.
// - `command.rs`:    SimCommand / SimAction, player selection and UI mode.
// - `input.rs`:      Per-tick input snapshot (pointer, click edge, key flags).
// - `event.rs`:      Narrative SimEvents: alerts and sound cues.
// - `config.rs`:     GameConfig, all tunable parameters and policies.
// - `settings.rs`:   AudioSettings, persisted alongside the game but owned by the caller.
// - `error.rs`:      Error enums for config, purchase, fertilizer, save and load.
// - `types.rs`:      Point, Rect, entity IDs, Variety, Stage, AutomationKind.
// - `prng`:          Re-exported from `idle_garden_prng`.
//
// The companion crate `idle_garden_headless` drives this library from the
// command line and owns file I/O.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, input, actions) -> (new_state, events)`. All randomness comes from
// a seeded xoshiro256++ PRNG. No `HashMap` iteration, no system time, no OS
// entropy. Use `BTreeMap` for ordered collections.

pub mod automation;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod ledger;
pub mod plant;
pub mod save;
pub mod settings;
pub mod sim;
pub mod soil;
pub mod types;

pub use idle_garden_prng as prng;
