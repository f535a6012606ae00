//! # engine_component
//!
//! The "C" in ECS — defines what a component is, how a single entity's
//! components are stored, and how a query describes the components it wants.
//!
//! This crate provides:
//!
//! - [`Component`] trait — the contract all ECS data must satisfy.
//! - [`AnyComponent`] — the object-safe, type-erased view of a component.
//! - [`Entity`] — lightweight `u64` entity identifiers.
//! - [`EntityAllocator`] — monotonically increasing ID allocator.
//! - [`ComponentContainer`] — one entity's components, keyed by type.
//! - [`QueryDescriptor`] — required/excluded component type sets.

pub mod component;
pub mod container;
pub mod entity;
pub mod query;

pub use component::{AnyComponent, Component, ComponentTypeId};
pub use container::ComponentContainer;
pub use entity::{Entity, EntityAllocator};
pub use query::QueryDescriptor;
