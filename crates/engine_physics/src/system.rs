//! Drives a [`PhysicsBackend`] from the registry.

use std::collections::BTreeSet;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, trace};

use engine_ecs::{Entity, Priority, Query, Registry, System};
use engine_event::EventSender;
use engine_math::{Transform3D, Vec3};
use engine_scene::{depth, local_from_world, world_transform};

use crate::backend::{BodyState, PhysicsBackend, RayHit};
use crate::components::{Collider, RigidBody};
use crate::event::CollisionEvent;

/// Steps the backend once per tick and reports contact changes.
///
/// Each tick:
///
/// 1. snapshot every entity with [`RigidBody`] and [`Transform3D`], with its
///    transform resolved into world space through any parents,
/// 2. await [`PhysicsBackend::step`],
/// 3. write moved transforms (converted back to local space, parents first)
///    and changed velocities back,
/// 4. compare the contact set with the previous tick and broadcast
///    `CollisionStart` for new pairs and `CollisionEnd` for vanished ones.
///
/// Events land in the queue behind `events` and are delivered on its next
/// `update`.
pub struct PhysicsSystem<B> {
    backend: B,
    events: EventSender<CollisionEvent>,
    query: Query,
    contacts: BTreeSet<(Entity, Entity)>,
}

impl<B: PhysicsBackend> PhysicsSystem<B> {
    pub fn new(backend: B, events: EventSender<CollisionEvent>) -> Self {
        Self {
            backend,
            events,
            query: Query::new().with::<RigidBody>().with::<Transform3D>(),
            contacts: BTreeSet::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Pairs touching after the last step.
    pub fn contacts(&self) -> impl Iterator<Item = (Entity, Entity)> + '_ {
        self.contacts.iter().copied()
    }

    /// Ray query against the state of the last step.
    pub async fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.backend.cast_ray(origin, direction, max_distance).await
    }

    fn gather<W>(&self, registry: &Registry<W>) -> Vec<BodyState> {
        self.query
            .execute(registry)
            .into_iter()
            .filter_map(|entity| {
                let components = registry.get_components(entity)?;
                Some(BodyState {
                    entity,
                    transform: world_transform(registry, entity)?,
                    body: *components.get::<RigidBody>()?,
                    collider: components.get::<Collider>().copied(),
                })
            })
            .collect()
    }

    async fn tick<W>(&mut self, registry: &mut Registry<W>, delta: f32) {
        let bodies = self.gather(registry);
        let output = self.backend.step(&bodies, delta).await;

        let mut moved = output.transforms;
        // A child's local transform is taken against its parent's new pose.
        moved.sort_by_cached_key(|&(entity, _)| depth(registry, entity));
        for (entity, world) in moved {
            let local = local_from_world(registry, entity, world);
            if let Some(t) = registry.get_component_mut::<Transform3D>(entity) {
                *t = local;
            }
        }
        for (entity, velocity) in output.velocities {
            if let Some(body) = registry.get_component_mut::<RigidBody>(entity) {
                body.velocity = velocity;
            }
        }

        let current: BTreeSet<_> = output.contacts.into_iter().collect();
        for &(a, b) in current.difference(&self.contacts) {
            debug!(%a, %b, "collision start");
            self.events.broadcast(CollisionEvent::start(a, b));
        }
        for &(a, b) in self.contacts.difference(&current) {
            debug!(%a, %b, "collision end");
            self.events.broadcast(CollisionEvent::end(a, b));
        }
        trace!(bodies = bodies.len(), contacts = current.len(), "physics tick");
        self.contacts = current;
    }
}

impl<W: Send, B: PhysicsBackend> System<W> for PhysicsSystem<B> {
    fn name(&self) -> &'static str {
        "PhysicsSystem"
    }

    fn priority(&self) -> Priority {
        Priority::PreUpdate
    }

    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<W>,
        _world: &'a mut W,
        delta: f32,
    ) -> BoxFuture<'a, ()> {
        self.tick(registry, delta).boxed()
    }
}
