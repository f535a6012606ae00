//! Query descriptors.
//!
//! A [`QueryDescriptor`] declares which component types an entity must have
//! and which it must not have. It is pure data: evaluating it against live
//! storage is the registry's job, via [`QueryDescriptor::matches`].

use crate::component::{Component, ComponentTypeId};
use crate::container::ComponentContainer;

/// Required/excluded component type sets.
///
/// An entity matches when its container holds every required type and none
/// of the excluded types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
    /// Component types an entity must have.
    pub required: Vec<ComponentTypeId>,
    /// Component types an entity must not have.
    pub excluded: Vec<ComponentTypeId>,
}

impl QueryDescriptor {
    /// Create a new empty query descriptor. It matches every entity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Build a descriptor from explicit required/excluded lists.
    #[must_use]
    pub fn from_types(required: &[ComponentTypeId], excluded: &[ComponentTypeId]) -> Self {
        let mut q = Self::new();
        for &ty in required {
            q = q.require(ty);
        }
        for &ty in excluded {
            q = q.exclude(ty);
        }
        q
    }

    /// Add a required component type. Duplicates are ignored.
    #[must_use]
    pub fn require(mut self, type_id: ComponentTypeId) -> Self {
        if !self.required.contains(&type_id) {
            self.required.push(type_id);
        }
        self
    }

    /// Add an excluded component type. Duplicates are ignored.
    #[must_use]
    pub fn exclude(mut self, type_id: ComponentTypeId) -> Self {
        if !self.excluded.contains(&type_id) {
            self.excluded.push(type_id);
        }
        self
    }

    /// Typed shorthand for [`require`](Self::require).
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.require(ComponentTypeId::of::<T>())
    }

    /// Typed shorthand for [`exclude`](Self::exclude).
    #[must_use]
    pub fn without<T: Component>(self) -> Self {
        self.exclude(ComponentTypeId::of::<T>())
    }

    /// Returns `true` if a type is both required and excluded, which makes
    /// the descriptor unsatisfiable.
    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        self.required.iter().any(|ty| self.excluded.contains(ty))
    }

    /// Evaluate the descriptor against one entity's components.
    #[must_use]
    pub fn matches(&self, container: &ComponentContainer) -> bool {
        container.has_all(&self.required) && !container.has_any(&self.excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    impl Component for A {
        fn type_name() -> &'static str {
            "A"
        }
    }

    struct B;
    impl Component for B {
        fn type_name() -> &'static str {
            "B"
        }
    }

    #[test]
    fn test_empty_descriptor_matches_everything() {
        let q = QueryDescriptor::new();
        assert!(q.matches(&ComponentContainer::new()));
    }

    #[test]
    fn test_required_and_excluded() {
        let q = QueryDescriptor::new().with::<A>().without::<B>();

        let mut only_a = ComponentContainer::new();
        only_a.add(A);
        assert!(q.matches(&only_a));

        let mut a_and_b = ComponentContainer::new();
        a_and_b.add(A);
        a_and_b.add(B);
        assert!(!q.matches(&a_and_b));

        let mut only_b = ComponentContainer::new();
        only_b.add(B);
        assert!(!q.matches(&only_b));
    }

    #[test]
    fn test_duplicates_ignored() {
        let q = QueryDescriptor::new().with::<A>().with::<A>().without::<B>().without::<B>();
        assert_eq!(q.required.len(), 1);
        assert_eq!(q.excluded.len(), 1);
    }

    #[test]
    fn test_contradictory() {
        let q = QueryDescriptor::new().with::<A>().without::<A>();
        assert!(q.is_contradictory());

        let mut c = ComponentContainer::new();
        c.add(A);
        assert!(!q.matches(&c));
        assert!(!q.matches(&ComponentContainer::new()));
    }

    #[test]
    fn test_from_types() {
        let q = QueryDescriptor::from_types(&[ComponentTypeId::of::<A>()], &[ComponentTypeId::of::<B>()]);
        assert_eq!(q, QueryDescriptor::new().with::<A>().without::<B>());
    }
}
