//! Reusable entity filters.
//!
//! A [`Query`] is built once, typically in a system's constructor, and
//! executed every tick. It holds no entity state: every
//! [`execute`](Query::execute) re-filters the live registry, so a component
//! added or removed since the last call is always reflected.

use engine_component::{Component, ComponentTypeId, Entity, QueryDescriptor};

use crate::registry::Registry;

/// A named, reusable filter over a [`Registry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    descriptor: QueryDescriptor,
}

impl Query {
    /// A query that matches every entity until narrowed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A query over the given required component types.
    #[must_use]
    pub fn from_types(required: &[ComponentTypeId]) -> Self {
        Self {
            descriptor: QueryDescriptor::from_types(required, &[]),
        }
    }

    #[must_use]
    pub fn from_descriptor(descriptor: QueryDescriptor) -> Self {
        Self { descriptor }
    }

    /// Require component `T`.
    #[must_use]
    pub fn with<T: Component>(mut self) -> Self {
        self.descriptor = self.descriptor.with::<T>();
        self
    }

    /// Exclude entities carrying component `T`.
    #[must_use]
    pub fn without<T: Component>(mut self) -> Self {
        self.descriptor = self.descriptor.without::<T>();
        self
    }

    #[must_use]
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Matching entities in registry iteration (creation) order.
    #[must_use]
    pub fn execute<W>(&self, registry: &Registry<W>) -> Vec<Entity> {
        registry.query_matching(&self.descriptor)
    }

    /// Returns `true` if `entity` currently matches.
    #[must_use]
    pub fn matches<W>(&self, registry: &Registry<W>, entity: Entity) -> bool {
        registry
            .get_components(entity)
            .is_some_and(|c| self.descriptor.matches(c))
    }
}
