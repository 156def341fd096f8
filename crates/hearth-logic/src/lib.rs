//! Pure gameplay logic for Hearth.
//!
//! This crate contains the fireplace, floating damage text and random
//! animation logic, independent of any database, engine, or runtime.
//! Host services (clock, physics probes, inventory, localization,
//! replication transport) come in as traits or plain data, so every
//! behavior is unit-testable and portable across the SpacetimeDB module,
//! the headless harness, and any future engine.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`clock`] | Tick-based clock trait and a manual clock for tests |
//! | [`config`] | Fireplace tuning, validation, JSON presets |
//! | [`constants`] | Persisted keys, cadences, thresholds, message keys |
//! | [`damage_text`] | Floating damage numbers: spawn, fade, rise, cull |
//! | [`environment`] | Blocked / wet checks against an environment probe |
//! | [`fireplace`] | Fuel state machine: decay, burning predicate, add fuel |
//! | [`interaction`] | "Use" and "use item" player actions |
//! | [`random_animation`] | Randomized animator parameters with owner sync |
//! | [`replication`] | Ownership, owner-bound requests, snapshots |
//! | [`scheduler`] | Repeating timers for the periodic fireplace tasks |
//! | [`store`] | Replicated key/value object store |
//! | [`visual`] | Flame visual selection (normal / high / low) |

pub mod clock;
pub mod config;
pub mod constants;
pub mod damage_text;
pub mod environment;
pub mod fireplace;
pub mod interaction;
pub mod random_animation;
pub mod replication;
pub mod scheduler;
pub mod store;
pub mod visual;
