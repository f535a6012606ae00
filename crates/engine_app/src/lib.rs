//! # engine_app
//!
//! Hosts a [`World`] and drives it:
//!
//! - [`EngineConfig`] — tick rate, delta clamp and input bindings, from
//!   defaults, JSON and `ENGINE_*` environment variables.
//! - [`World`] / [`WorldContext`] — the registry plus the event queues, input
//!   manager and frame time its systems share.
//! - [`Engine`] / [`GameState`] — state lifecycle (`Loading` → `Ready` or
//!   `Failed`) and per-frame delta clamping.
//! - [`TickLoop`] — fixed-rate host loop on a tokio interval.
//! - [`demo`] — the headless demo scene run by the binary.

pub mod config;
pub mod demo;
pub mod engine;
pub mod tick;
pub mod world;

pub use config::{ConfigError, EngineConfig};
pub use demo::{DemoState, PlayerControl, PlayerControlSystem};
pub use engine::{Engine, GameState, StateStatus};
pub use tick::TickLoop;
pub use world::{Time, World, WorldContext};
