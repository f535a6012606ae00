//! # engine_physics
//!
//! The contract between the registry and a physics engine. The engine owns no
//! solver: it snapshots body data, awaits a [`PhysicsBackend`], writes the
//! results back and turns contact changes into [`CollisionEvent`]s.
//!
//! - [`RigidBody`] / [`Collider`] / [`CollisionClass`] — body components.
//! - [`PhysicsBackend`] — async `step` and `cast_ray`.
//! - [`OverlapBackend`] — built-in integration and overlap detection.
//! - [`PhysicsSystem`] — runs at `PreUpdate`, broadcasts collision events.

pub mod backend;
pub mod components;
pub mod event;
pub mod system;

pub use backend::{BodyState, OverlapBackend, PhysicsBackend, RayHit, StepOutput};
pub use components::{BodyKind, Collider, ColliderShape, CollisionClass, RigidBody};
pub use event::{CollisionEvent, CollisionEventType};
pub use system::PhysicsSystem;
