//! The entity registry.
//!
//! The [`Registry`] exclusively owns every entity, every entity's
//! [`ComponentContainer`], and the system list. Systems only ever borrow it
//! for the duration of their `update`.
//!
//! ## Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Registry<W>                                               │
//! │                                                           │
//! │  allocator: EntityAllocator      (0, 1, 2, … never reused)│
//! │  entities:  BTreeMap<Entity, ComponentContainer>          │
//! │  systems:   SystemList<W>        (sorted by Priority)     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Because ids only grow, ordering the entity map by id is the same as
//! ordering it by creation, which gives queries a reproducible result order.
//!
//! ## Missing entities
//!
//! Mutating an entity that does not exist is a silent no-op (the call
//! returns `false`/`None` and logs at `debug`). Use
//! [`try_add_component`](Registry::try_add_component) to get an
//! [`EcsError`] instead.

use std::collections::BTreeMap;

use tracing::{debug, trace, trace_span, Instrument};

use engine_component::{
    AnyComponent, Component, ComponentContainer, ComponentTypeId, Entity, EntityAllocator,
    QueryDescriptor,
};

use crate::error::EcsError;
use crate::query::Query;
use crate::scheduler::{SystemEntry, SystemId, SystemList};
use crate::system::{Priority, System};

/// Entity identity, component storage, and the per-tick system pass.
///
/// `W` is the world context handed to systems; see [`System`].
pub struct Registry<W = ()> {
    /// Entity ID allocator.
    allocator: EntityAllocator,
    /// Live entities and their components, in creation order.
    entities: BTreeMap<Entity, ComponentContainer>,
    /// Registered systems, sorted by priority.
    systems: SystemList<W>,
    next_system: u64,
    /// `true` while [`update`](Self::update) is running.
    in_pass: bool,
    /// Ids of the systems detached for the current pass.
    running_ids: Vec<SystemId>,
    /// Removals requested mid-pass for systems that are currently running.
    pending_removals: Vec<SystemId>,
    /// Completed system passes.
    passes: u64,
}

impl<W> Registry<W> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entities: BTreeMap::new(),
            systems: SystemList::new(),
            next_system: 0,
            in_pass: false,
            running_ids: Vec::new(),
            pending_removals: Vec::new(),
            passes: 0,
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Allocate a new, empty entity.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.entities.insert(entity, ComponentContainer::new());
        trace!(%entity, "entity created");
        entity
    }

    /// Allocate a new entity seeded with `components`.
    ///
    /// Later components in the list replace earlier ones of the same type.
    pub fn create_entity_with(&mut self, components: Vec<Box<dyn AnyComponent>>) -> Entity {
        let entity = self.create_entity();
        self.add_components(entity, components);
        entity
    }

    /// Delete an entity and all of its components.
    ///
    /// Returns `false` (and changes nothing) if the entity does not exist.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        let removed = self.entities.remove(&entity).is_some();
        if removed {
            trace!(%entity, "entity removed");
        }
        removed
    }

    /// Remove every entity. The id allocator is not reset.
    pub fn clear_entities(&mut self) {
        debug!(count = self.entities.len(), "clearing all entities");
        self.entities.clear();
    }

    /// Returns `true` if the entity exists.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys().copied()
    }

    // ── Components ───────────────────────────────────────────────────

    /// Insert or replace a component.
    ///
    /// Returns `false` if the entity does not exist; the component is dropped.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> bool {
        match self.entities.get_mut(&entity) {
            Some(container) => {
                container.add(component);
                true
            }
            None => {
                debug!(%entity, component = T::type_name(), "add_component on missing entity ignored");
                false
            }
        }
    }

    /// Insert or replace a component, reporting a missing entity as an error.
    ///
    /// On success returns the replaced component, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the entity does not exist.
    pub fn try_add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        self.entities
            .get_mut(&entity)
            .map(|container| container.add(component))
            .ok_or(EcsError::EntityNotFound(entity))
    }

    /// Insert or replace several type-erased components.
    ///
    /// Returns `false` if the entity does not exist.
    pub fn add_components(&mut self, entity: Entity, components: Vec<Box<dyn AnyComponent>>) -> bool {
        match self.entities.get_mut(&entity) {
            Some(container) => {
                for component in components {
                    container.add_boxed(component);
                }
                true
            }
            None => {
                debug!(%entity, count = components.len(), "add_components on missing entity ignored");
                false
            }
        }
    }

    /// Remove and return a component. `None` if the entity or the component
    /// is absent.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        self.entities.get_mut(&entity)?.remove::<T>()
    }

    /// Remove a component by type id. Returns `true` if something was removed.
    pub fn remove_component_type(&mut self, entity: Entity, type_id: ComponentTypeId) -> bool {
        self.entities
            .get_mut(&entity)
            .is_some_and(|c| c.remove_type(type_id))
    }

    #[must_use]
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.entities.get(&entity)?.get::<T>()
    }

    #[must_use]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.entities.get_mut(&entity)?.get_mut::<T>()
    }

    /// Like [`get_component`](Self::get_component) but distinguishes a missing
    /// entity from a missing component.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] or [`EcsError::ComponentNotFound`].
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.entities
            .get(&entity)
            .ok_or(EcsError::EntityNotFound(entity))?
            .get::<T>()
            .ok_or(EcsError::ComponentNotFound {
                entity,
                component: T::type_name(),
            })
    }

    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_some()
    }

    /// All components of an entity.
    #[must_use]
    pub fn get_components(&self, entity: Entity) -> Option<&ComponentContainer> {
        self.entities.get(&entity)
    }

    /// Mutable access to all components of an entity, for systems that need
    /// to read one component while writing another.
    #[must_use]
    pub fn get_components_mut(&mut self, entity: Entity) -> Option<&mut ComponentContainer> {
        self.entities.get_mut(&entity)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// A reusable query over the given required types.
    #[must_use]
    pub fn create_query(&self, required: &[ComponentTypeId]) -> Query {
        Query::from_types(required)
    }

    /// Entities holding every `required` type and none of the `excluded`
    /// types, in creation order.
    #[must_use]
    pub fn query_entities(
        &self,
        required: &[ComponentTypeId],
        excluded: &[ComponentTypeId],
    ) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|(_, c)| c.has_all(required) && !c.has_any(excluded))
            .map(|(e, _)| *e)
            .collect()
    }

    /// [`query_entities`](Self::query_entities) driven by a descriptor.
    #[must_use]
    pub fn query_matching(&self, descriptor: &QueryDescriptor) -> Vec<Entity> {
        self.query_entities(&descriptor.required, &descriptor.excluded)
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Register a system. It is placed after every system of lower or equal
    /// priority.
    ///
    /// Systems added during [`update`](Self::update) first run on the next
    /// pass.
    pub fn add_system<S: System<W> + 'static>(&mut self, system: S) -> SystemId {
        self.add_boxed_system(Box::new(system))
    }

    /// [`add_system`](Self::add_system) for an already boxed system.
    pub fn add_boxed_system(&mut self, system: Box<dyn System<W>>) -> SystemId {
        let id = SystemId(self.next_system);
        self.next_system += 1;
        let priority = system.priority();
        debug!(system = system.name(), ?priority, id = id.0, "system added");
        self.systems.push(SystemEntry {
            id,
            priority,
            system,
        });
        id
    }

    /// Unregister a system. Returns `false` if it is not registered.
    ///
    /// A system removed during [`update`](Self::update) still completes the
    /// current pass.
    pub fn remove_system(&mut self, id: SystemId) -> bool {
        if self.systems.remove(id) {
            debug!(id = id.0, "system removed");
            return true;
        }
        if self.in_pass && self.running_ids.contains(&id) && !self.pending_removals.contains(&id) {
            // The running list is detached during a pass; settle afterwards.
            self.pending_removals.push(id);
            return true;
        }
        false
    }

    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Names and priorities of the registered systems in execution order.
    #[must_use]
    pub fn system_order(&self) -> Vec<(SystemId, &'static str, Priority)> {
        self.systems
            .iter()
            .map(|e| (e.id, e.system.name(), e.priority))
            .collect()
    }

    /// Number of completed system passes.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run every system once, in priority order, awaiting each before the
    /// next starts.
    ///
    /// If the returned future is dropped before completion, the systems are
    /// still restored (along with any added or removed mid-pass); only the
    /// pass counter is left unchanged.
    pub async fn update(&mut self, world: &mut W, delta: f32) {
        let running = std::mem::take(&mut self.systems);
        self.running_ids = running.iter().map(|e| e.id).collect();
        self.in_pass = true;
        let mut pass = Pass {
            registry: self,
            running,
        };

        for entry in pass.running.iter_mut() {
            let span = trace_span!("system", system = entry.system.name(), priority = ?entry.priority);
            entry
                .system
                .update(&mut *pass.registry, world, delta)
                .instrument(span)
                .await;
        }
        pass.registry.passes += 1;
    }

    /// Reattach the systems detached by [`update`](Self::update) and apply
    /// the additions and removals requested while they were running.
    fn finish_pass(&mut self, running: SystemList<W>) {
        self.in_pass = false;
        self.running_ids.clear();
        let added = std::mem::replace(&mut self.systems, running);
        for id in std::mem::take(&mut self.pending_removals) {
            if self.systems.remove(id) {
                debug!(id = id.0, "system removed");
            }
        }
        if !added.is_empty() {
            self.systems.append(added);
        }
    }
}

/// The systems detached for one pass. Dropping it, whether the pass ran to
/// completion or its future was cancelled, hands them back to the registry.
struct Pass<'r, W> {
    registry: &'r mut Registry<W>,
    running: SystemList<W>,
}

impl<W> Drop for Pass<'_, W> {
    fn drop(&mut self) {
        let running = std::mem::take(&mut self.running);
        self.registry.finish_pass(running);
    }
}

impl<W> Default for Registry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> std::fmt::Debug for Registry<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entities.len())
            .field("next_entity", &self.allocator.peek())
            .field("systems", &self.system_order())
            .field("passes", &self.passes)
            .finish()
    }
}
