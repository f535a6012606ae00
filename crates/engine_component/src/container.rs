//! Per-entity component storage.
//!
//! A [`ComponentContainer`] holds every component attached to one entity,
//! keyed by [`ComponentTypeId`]. There is at most one slot per concrete type:
//! adding a component whose type is already present replaces the old value.
//! Types that share a [`Component::type_name`] still get separate slots.

use std::collections::HashMap;

use crate::component::{AnyComponent, Component, ComponentTypeId};

/// The components attached to a single entity.
#[derive(Default)]
pub struct ComponentContainer {
    components: HashMap<ComponentTypeId, Box<dyn AnyComponent>>,
}

impl ComponentContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Insert a component, replacing any existing component of the same type.
    ///
    /// Returns the replaced value, if there was one.
    pub fn add<T: Component>(&mut self, component: T) -> Option<T> {
        self.components
            .insert(ComponentTypeId::of::<T>(), Box::new(component))
            .and_then(|old| old.into_any().downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Insert a type-erased component, replacing any existing component of
    /// the same type.
    pub fn add_boxed(&mut self, component: Box<dyn AnyComponent>) -> Option<Box<dyn AnyComponent>> {
        self.components.insert(component.dyn_type_id(), component)
    }

    /// Shared access to the component of type `T`.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&ComponentTypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref::<T>())
    }

    /// Mutable access to the component of type `T`.
    #[must_use]
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&ComponentTypeId::of::<T>())
            .and_then(|c| c.as_any_mut().downcast_mut::<T>())
    }

    /// Type-erased access by id.
    #[must_use]
    pub fn get_dyn(&self, type_id: ComponentTypeId) -> Option<&dyn AnyComponent> {
        self.components.get(&type_id).map(|c| c.as_ref())
    }

    /// Returns `true` if a component of type `T` is present.
    ///
    /// Agrees with [`get`](Self::get) by construction.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Returns `true` if a component with the given type id is present.
    #[must_use]
    pub fn has_type(&self, type_id: ComponentTypeId) -> bool {
        self.components.contains_key(&type_id)
    }

    /// Returns `true` if every listed type is present. An empty list matches.
    #[must_use]
    pub fn has_all(&self, type_ids: &[ComponentTypeId]) -> bool {
        type_ids.iter().all(|id| self.has_type(*id))
    }

    /// Returns `true` if at least one listed type is present. An empty list
    /// never matches.
    #[must_use]
    pub fn has_any(&self, type_ids: &[ComponentTypeId]) -> bool {
        type_ids.iter().any(|id| self.has_type(*id))
    }

    /// Remove and return the component of type `T`.
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        self.components
            .remove(&ComponentTypeId::of::<T>())
            .and_then(|c| c.into_any().downcast::<T>().ok())
            .map(|c| *c)
    }

    /// Remove the component with the given type id. Returns `true` if a
    /// component was removed.
    pub fn remove_type(&mut self, type_id: ComponentTypeId) -> bool {
        self.components.remove(&type_id).is_some()
    }

    /// The type ids present, in ascending id order.
    #[must_use]
    pub fn type_ids(&self) -> Vec<ComponentTypeId> {
        let mut ids: Vec<_> = self.components.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Iterate over all components in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn AnyComponent> {
        self.components.values().map(|c| c.as_ref())
    }

    /// Number of components held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for ComponentContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.components.values().map(|c| c.dyn_type_name()).collect();
        names.sort_unstable();
        f.debug_struct("ComponentContainer")
            .field("components", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position(f32, f32);

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity(f32, f32);

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Frozen;

    impl Component for Frozen {
        fn type_name() -> &'static str {
            "Frozen"
        }
    }

    #[test]
    fn test_add_and_get() {
        let mut c = ComponentContainer::new();
        assert!(c.add(Position(1.0, 2.0)).is_none());
        assert_eq!(c.get::<Position>(), Some(&Position(1.0, 2.0)));
        assert!(c.get::<Velocity>().is_none());
    }

    #[test]
    fn test_add_same_type_replaces() {
        let mut c = ComponentContainer::new();
        c.add(Position(1.0, 1.0));
        let old = c.add(Position(2.0, 2.0));
        assert_eq!(old, Some(Position(1.0, 1.0)));
        assert_eq!(c.get::<Position>(), Some(&Position(2.0, 2.0)));
        assert_eq!(c.len(), 1);
    }

    mod imported {
        #[derive(Debug, Clone, PartialEq)]
        pub struct Position(pub i32);

        impl super::Component for Position {
            fn type_name() -> &'static str {
                "Position"
            }
        }
    }

    #[test]
    fn test_same_named_types_keep_separate_slots() {
        let mut c = ComponentContainer::new();
        c.add(Position(1.0, 2.0));
        assert!(c.add(imported::Position(7)).is_none());

        assert_eq!(c.len(), 2);
        assert_eq!(c.get::<Position>(), Some(&Position(1.0, 2.0)));
        assert_eq!(c.get::<imported::Position>(), Some(&imported::Position(7)));
        assert!(c.has_all(&[
            ComponentTypeId::of::<Position>(),
            ComponentTypeId::of::<imported::Position>(),
        ]));

        assert_eq!(c.remove::<Position>(), Some(Position(1.0, 2.0)));
        assert!(!c.has::<Position>());
        assert!(!c.has_type(ComponentTypeId::of::<Position>()));
        assert!(c.has::<imported::Position>());
    }

    #[test]
    fn test_has_agrees_with_get() {
        let mut c = ComponentContainer::new();
        assert_eq!(c.has::<Position>(), c.get::<Position>().is_some());
        c.add(Position(0.0, 0.0));
        assert_eq!(c.has::<Position>(), c.get::<Position>().is_some());
        c.remove::<Position>();
        assert_eq!(c.has::<Position>(), c.get::<Position>().is_some());
        assert!(!c.has::<Position>());
    }

    #[test]
    fn test_has_all_and_has_any() {
        let mut c = ComponentContainer::new();
        c.add(Position(0.0, 0.0));
        c.add(Velocity(1.0, 0.0));

        let pos = ComponentTypeId::of::<Position>();
        let vel = ComponentTypeId::of::<Velocity>();
        let frozen = ComponentTypeId::of::<Frozen>();

        assert!(c.has_all(&[pos, vel]));
        assert!(!c.has_all(&[pos, frozen]));
        assert!(c.has_all(&[]));

        assert!(c.has_any(&[frozen, vel]));
        assert!(!c.has_any(&[frozen]));
        assert!(!c.has_any(&[]));
    }

    #[test]
    fn test_get_mut_mutates_in_place() {
        let mut c = ComponentContainer::new();
        c.add(Velocity(0.0, 0.0));
        if let Some(v) = c.get_mut::<Velocity>() {
            v.0 = 5.0;
        }
        assert_eq!(c.get::<Velocity>(), Some(&Velocity(5.0, 0.0)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut c = ComponentContainer::new();
        c.add(Position(0.0, 0.0));
        assert!(c.remove::<Velocity>().is_none());
        assert!(!c.remove_type(ComponentTypeId::of::<Frozen>()));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_add_boxed() {
        let mut c = ComponentContainer::new();
        c.add_boxed(Box::new(Frozen));
        assert!(c.has::<Frozen>());
        assert_eq!(
            c.get_dyn(ComponentTypeId::of::<Frozen>()).map(|f| f.dyn_type_name()),
            Some("Frozen")
        );
    }

    #[test]
    fn test_debug_lists_names() {
        let mut c = ComponentContainer::new();
        c.add(Velocity(0.0, 0.0));
        c.add(Frozen);
        assert_eq!(
            format!("{c:?}"),
            "ComponentContainer { components: [\"Frozen\", \"Velocity\"] }"
        );
    }
}
