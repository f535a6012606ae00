//! # engine_ecs
//!
//! The registry at the heart of the engine: it owns entity identity, every
//! entity's [`ComponentContainer`](engine_component::ComponentContainer), and
//! the ordered list of systems run once per tick.
//!
//! This crate provides:
//!
//! - [`Registry`] — entity lifecycle, component CRUD, system registration and
//!   the per-tick system pass.
//! - [`Query`] — a reusable required/excluded filter evaluated fresh on every
//!   [`execute`](Query::execute).
//! - [`System`] — the per-tick logic contract, with a [`Priority`].
//! - [`FnSystem`] — adapter turning a closure into a [`System`].
//!
//! ## Tick Model
//!
//! ```text
//! Registry::update(world, delta)
//!   for system in systems (ascending Priority, ties in insertion order):
//!       system.update(registry, world, delta).await   ← one at a time
//! ```
//!
//! A system's `update` returns a future. The pass awaits each future to
//! completion before starting the next system, so systems never interleave
//! even when one of them suspends on an external operation.

pub mod error;
pub mod query;
pub mod registry;
pub mod scheduler;
pub mod system;

pub use error::EcsError;
pub use query::Query;
pub use registry::Registry;
pub use scheduler::SystemId;
pub use system::{FnSystem, Priority, System};

// Re-export the component layer so downstream crates need one import path.
pub use engine_component::{
    AnyComponent, Component, ComponentContainer, ComponentTypeId, Entity, QueryDescriptor,
};
