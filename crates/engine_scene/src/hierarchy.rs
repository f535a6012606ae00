//! # Entity Hierarchies — Parent/Child Relationships
//!
//! Provides [`ParentEntity`] and [`GlobalTransform`] for expressing entity
//! hierarchies and resolving local transforms into world space.
//!
//! ## Usage
//!
//! ```ignore
//! let parent = registry.create_entity_with(vec![Box::new(Transform3D::from_xyz(100.0, 0.0, 0.0))]);
//! let child = registry.create_entity_with(vec![Box::new(Transform3D::from_xyz(10.0, 0.0, 0.0))]);
//! set_parent(&mut registry, child, parent);
//!
//! // world_transform(&registry, child).position == (110, 0, 0)
//! ```
//!
//! A parent id that no longer exists, or a loop in the parent chain, ends the
//! walk: the last valid ancestor is treated as a root.

use std::collections::HashSet;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use engine_ecs::{Component, Entity, Priority, Query, Registry, System};
use engine_math::Transform3D;

/// Marks an entity as a child of another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEntity(pub Entity);

impl Component for ParentEntity {
    fn type_name() -> &'static str {
        "ParentEntity"
    }
}

/// The world-space transform written by [`TransformPropagationSystem`].
///
/// For root entities this equals the local [`Transform3D`]. For children it
/// is `parent_global * child_local`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalTransform(pub Transform3D);

impl Component for GlobalTransform {
    fn type_name() -> &'static str {
        "GlobalTransform"
    }
}

/// Make `child` a child of `parent`.
///
/// Refuses (returning `false`) when either entity is missing or the link
/// would close a loop.
pub fn set_parent<W>(registry: &mut Registry<W>, child: Entity, parent: Entity) -> bool {
    if !registry.contains(child) || !registry.contains(parent) {
        return false;
    }
    if ancestors(registry, parent).contains(&child) || child == parent {
        debug!(%child, %parent, "parent link would create a cycle");
        return false;
    }
    registry.add_component(child, ParentEntity(parent))
}

/// Detach `child` from its parent. Returns `false` if it had none.
pub fn clear_parent<W>(registry: &mut Registry<W>, child: Entity) -> bool {
    registry.remove_component::<ParentEntity>(child).is_some()
}

/// Direct children of `parent`, in creation order.
pub fn children_of<W>(registry: &Registry<W>, parent: Entity) -> Vec<Entity> {
    Query::new()
        .with::<ParentEntity>()
        .execute(registry)
        .into_iter()
        .filter(|&e| registry.get_component::<ParentEntity>(e).map(|p| p.0) == Some(parent))
        .collect()
}

/// Remove `root` and all of its descendants. Returns how many entities were
/// removed.
pub fn remove_recursive<W>(registry: &mut Registry<W>, root: Entity) -> usize {
    let mut stack = vec![root];
    let mut removed = 0;
    while let Some(entity) = stack.pop() {
        stack.extend(children_of(registry, entity));
        if registry.remove_entity(entity) {
            removed += 1;
        }
    }
    removed
}

/// Live ancestors of `entity`, nearest first. Stops at a stale id or loop.
fn ancestors<W>(registry: &Registry<W>, entity: Entity) -> Vec<Entity> {
    let mut seen = HashSet::from([entity]);
    let mut chain = Vec::new();
    let mut current = entity;
    while let Some(&ParentEntity(parent)) = registry.get_component::<ParentEntity>(current) {
        if !registry.contains(parent) {
            trace!(%current, %parent, "stale parent id");
            break;
        }
        if !seen.insert(parent) {
            debug!(%entity, "cycle in parent chain");
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

/// Resolve `entity`'s transform into world space by walking its parent chain.
///
/// Entities without a [`Transform3D`] contribute the identity. Returns `None`
/// only if `entity` itself does not exist.
pub fn world_transform<W>(registry: &Registry<W>, entity: Entity) -> Option<Transform3D> {
    if !registry.contains(entity) {
        return None;
    }
    let local = |e: Entity| {
        registry
            .get_component::<Transform3D>(e)
            .copied()
            .unwrap_or_default()
    };
    let world = ancestors(registry, entity)
        .into_iter()
        .rev()
        .fold(Transform3D::IDENTITY, |acc, e| acc.mul_transform(&local(e)));
    Some(world.mul_transform(&local(entity)))
}

/// Number of live ancestors above `entity`; 0 for a root.
pub fn depth<W>(registry: &Registry<W>, entity: Entity) -> usize {
    ancestors(registry, entity).len()
}

/// The local transform that puts `entity` at `world`, given where its
/// ancestors currently are. Roots, and children of a stale parent, get
/// `world` back unchanged.
pub fn local_from_world<W>(registry: &Registry<W>, entity: Entity, world: Transform3D) -> Transform3D {
    let parent = match registry.get_component::<ParentEntity>(entity) {
        Some(&ParentEntity(parent)) if registry.contains(parent) => parent,
        _ => return world,
    };
    let Some(parent_world) = world_transform(registry, parent) else {
        return world;
    };
    Transform3D::from_matrix(parent_world.to_matrix().inverse() * world.to_matrix())
}

/// Writes a [`GlobalTransform`] for every entity with a [`Transform3D`].
///
/// Runs at [`Priority::PostUpdate`], after gameplay has moved things and
/// before rendering reads them.
#[derive(Debug)]
pub struct TransformPropagationSystem {
    query: Query,
}

impl TransformPropagationSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: Query::new().with::<Transform3D>(),
        }
    }

    /// Propagate synchronously. Returns the number of entities written.
    pub fn propagate<W>(&self, registry: &mut Registry<W>) -> usize {
        let resolved: Vec<_> = self
            .query
            .execute(registry)
            .into_iter()
            .filter_map(|e| world_transform(registry, e).map(|t| (e, t)))
            .collect();
        let count = resolved.len();
        for (entity, transform) in resolved {
            registry.add_component(entity, GlobalTransform(transform));
        }
        count
    }
}

impl Default for TransformPropagationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Send> System<W> for TransformPropagationSystem {
    fn priority(&self) -> Priority {
        Priority::PostUpdate
    }

    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<W>,
        _world: &'a mut W,
        _delta: f32,
    ) -> BoxFuture<'a, ()> {
        let count = self.propagate(registry);
        trace!(count, "transforms propagated");
        futures::future::ready(()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use engine_math::{Quat, Vec3};

    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn spawn(registry: &mut Registry<()>, x: f32) -> Entity {
        registry.create_entity_with(vec![Box::new(Transform3D::from_xyz(x, 0.0, 0.0))])
    }

    #[test]
    fn test_root_world_transform_is_local() {
        let mut registry = Registry::new();
        let root = spawn(&mut registry, 10.0);
        let world = world_transform(&registry, root).unwrap();
        assert!(approx(world.position, Vec3::new(10.0, 0.0, 0.0)));
        assert!(world_transform(&registry, Entity(99)).is_none());
    }

    #[test]
    fn test_deep_hierarchy() {
        let mut registry = Registry::new();
        let a = spawn(&mut registry, 1.0);
        let b = spawn(&mut registry, 2.0);
        let c = spawn(&mut registry, 3.0);
        assert!(set_parent(&mut registry, b, a));
        assert!(set_parent(&mut registry, c, b));

        let world = world_transform(&registry, c).unwrap();
        assert!(approx(world.position, Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn test_child_inherits_parent_rotation() {
        let mut registry = Registry::new();
        let parent = registry.create_entity_with(vec![Box::new(Transform3D::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ))]);
        let child = spawn(&mut registry, 1.0);
        set_parent(&mut registry, child, parent);

        let world = world_transform(&registry, child).unwrap();
        assert!(approx(world.position, Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_local_from_world_inverts_parent_chain() {
        let mut registry = Registry::new();
        let parent = registry.create_entity_with(vec![Box::new(Transform3D::from_position_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ))]);
        let child = spawn(&mut registry, 1.0);
        set_parent(&mut registry, child, parent);
        assert_eq!(depth(&registry, child), 1);
        assert_eq!(depth(&registry, parent), 0);

        let target = Transform3D::from_xyz(12.0, 3.0, 0.0);
        let local = local_from_world(&registry, child, target);
        assert!(approx(local.position, Vec3::new(0.0, 3.0, 2.0)));
        registry.add_component(child, local);
        let world = world_transform(&registry, child).unwrap();
        assert!(approx(world.position, target.position));

        assert_eq!(local_from_world(&registry, parent, target), target);
    }

    #[test]
    fn test_stale_parent_is_treated_as_root() {
        let mut registry = Registry::new();
        let parent = spawn(&mut registry, 100.0);
        let child = spawn(&mut registry, 5.0);
        set_parent(&mut registry, child, parent);
        registry.remove_entity(parent);

        let world = world_transform(&registry, child).unwrap();
        assert!(approx(world.position, Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_cycles_are_refused_and_survived() {
        let mut registry = Registry::new();
        let a = spawn(&mut registry, 1.0);
        let b = spawn(&mut registry, 2.0);
        assert!(set_parent(&mut registry, b, a));
        assert!(!set_parent(&mut registry, a, b));
        assert!(!set_parent(&mut registry, a, a));

        // Forced loop bypassing set_parent still terminates.
        registry.add_component(a, ParentEntity(b));
        assert!(world_transform(&registry, a).is_some());
        assert!(world_transform(&registry, b).is_some());
    }

    #[test]
    fn test_children_and_recursive_removal() {
        let mut registry = Registry::new();
        let root = spawn(&mut registry, 0.0);
        let child1 = spawn(&mut registry, 0.0);
        let child2 = spawn(&mut registry, 0.0);
        let grandchild = spawn(&mut registry, 0.0);
        let unrelated = spawn(&mut registry, 0.0);
        set_parent(&mut registry, child1, root);
        set_parent(&mut registry, child2, root);
        set_parent(&mut registry, grandchild, child1);

        assert_eq!(children_of(&registry, root), vec![child1, child2]);
        assert!(clear_parent(&mut registry, child2));
        assert!(!clear_parent(&mut registry, child2));

        assert_eq!(remove_recursive(&mut registry, root), 3);
        assert!(!registry.contains(grandchild));
        assert!(registry.contains(child2));
        assert!(registry.contains(unrelated));
    }

    #[tokio::test]
    async fn test_propagation_system_writes_global_transform() {
        let mut registry: Registry<()> = Registry::new();
        let parent = spawn(&mut registry, 0.0);
        let child = spawn(&mut registry, 5.0);
        set_parent(&mut registry, child, parent);
        registry.add_system(TransformPropagationSystem::new());

        registry.update(&mut (), 0.016).await;

        // Move parent; child follows on the next pass.
        registry.get_component_mut::<Transform3D>(parent).unwrap().position = Vec3::new(50.0, 0.0, 0.0);
        registry.update(&mut (), 0.016).await;

        let global = registry.get_component::<GlobalTransform>(child).unwrap();
        assert!(approx(global.0.position, Vec3::new(55.0, 0.0, 0.0)));
    }
}
