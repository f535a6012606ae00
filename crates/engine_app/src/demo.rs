//! Headless demo scene.
//!
//! A camera looks at a rotating cube with an orbiting child, a ball falls
//! onto a fixed floor, and a player body moves with the bound movement
//! actions. Frames go to a backend that only logs and counts them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use engine_ecs::{Component, Priority, Query, Registry, System};
use engine_math::{Transform3D, Vec3};
use engine_physics::{
    Collider, CollisionClass, CollisionEvent, CollisionEventType, OverlapBackend, PhysicsSystem,
    RigidBody,
};
use engine_render::{Camera, Frame, MaterialRef, MeshRef, RenderBackend, RenderSystem, Visible};
use engine_scene::{Rotating, RotatingSystem, TransformPropagationSystem, set_parent};

use crate::engine::GameState;
use crate::world::{World, WorldContext};

/// Marks the entity steered by the movement actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerControl {
    /// Metres per second at full axis deflection.
    pub speed: f32,
}

impl Component for PlayerControl {
    fn type_name() -> &'static str {
        "PlayerControl"
    }
}

/// Turns the `move_*` and `jump` actions into the player body's velocity.
pub struct PlayerControlSystem {
    query: Query,
}

impl PlayerControlSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: Query::new().with::<PlayerControl>().with::<RigidBody>(),
        }
    }

    fn steer(&self, registry: &mut Registry<WorldContext>, ctx: &WorldContext) {
        let input = &ctx.input;
        let direction = Vec3::new(
            input.axis("move_left", "move_right"),
            if input.is_action_active("jump") { 1.0 } else { 0.0 },
            input.axis("move_forward", "move_back"),
        );
        if input.was_action_just_pressed("jump") {
            debug!("jump pressed");
        }

        for entity in self.query.execute(registry) {
            let Some(speed) = registry.get_component::<PlayerControl>(entity).map(|p| p.speed) else {
                continue;
            };
            if let Some(body) = registry.get_component_mut::<RigidBody>(entity) {
                body.velocity = direction * speed;
            }
        }
    }
}

impl Default for PlayerControlSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System<WorldContext> for PlayerControlSystem {
    fn name(&self) -> &'static str {
        "PlayerControlSystem"
    }

    fn priority(&self) -> Priority {
        Priority::Update
    }

    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<WorldContext>,
        world: &'a mut WorldContext,
        _delta: f32,
    ) -> BoxFuture<'a, ()> {
        self.steer(registry, world);
        futures::future::ready(()).boxed()
    }
}

/// Counters shared between the demo and whoever is watching it.
#[derive(Debug, Default)]
pub struct DemoStats {
    frames: AtomicU64,
    draw_items: AtomicUsize,
    collisions: AtomicU64,
}

impl DemoStats {
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Draw items in the most recent frame.
    pub fn draw_items(&self) -> usize {
        self.draw_items.load(Ordering::Relaxed)
    }

    /// `CollisionStart` events seen so far.
    pub fn collisions(&self) -> u64 {
        self.collisions.load(Ordering::Relaxed)
    }
}

/// Render backend that logs a summary of each frame.
#[derive(Debug, Clone)]
pub struct LoggingBackend {
    stats: Arc<DemoStats>,
}

impl RenderBackend for LoggingBackend {
    fn submit(&mut self, frame: &Frame) {
        let frames = self.stats.frames.fetch_add(1, Ordering::Relaxed) + 1;
        self.stats.draw_items.store(frame.items.len(), Ordering::Relaxed);
        debug!(
            frame = frames,
            items = frame.items.len(),
            material_switches = frame.material_switches(),
            camera = ?frame.camera,
            "frame"
        );
    }
}

#[derive(Debug, Default)]
pub struct DemoState {
    stats: Arc<DemoStats>,
}

impl DemoState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Arc<DemoStats> {
        Arc::clone(&self.stats)
    }

    fn populate(registry: &mut Registry<WorldContext>) {
        let camera = registry.create_entity_with(vec![
            Box::new(Transform3D::from_xyz(0.0, 2.0, 5.0)),
            Box::new(Camera::default()),
        ]);

        let cube = registry.create_entity_with(vec![
            Box::new(Transform3D::from_xyz(0.0, 0.0, -3.0)),
            Box::new(Rotating::new(Vec3::new(0.0, 0.5, 0.35))),
            Box::new(MeshRef("cube".into())),
            Box::new(MaterialRef("crate".into())),
            Box::new(Visible),
        ]);

        let moon = registry.create_entity_with(vec![
            Box::new(Transform3D::from_xyz(1.5, 0.0, 0.0).scaled(0.3)),
            Box::new(MeshRef("sphere".into())),
            Box::new(Visible),
        ]);
        set_parent(registry, moon, cube);

        let props = CollisionClass::bit(1);
        let ball = registry.create_entity_with(vec![
            Box::new(Transform3D::from_xyz(2.0, 3.0, -3.0)),
            Box::new(RigidBody::dynamic(1.0)),
            Box::new(Collider::sphere(0.5).with_class(props)),
            Box::new(MeshRef("sphere".into())),
            Box::new(MaterialRef("rubber".into())),
            Box::new(Visible),
        ]);

        let floor = registry.create_entity_with(vec![
            Box::new(Transform3D::from_xyz(0.0, -1.0, -3.0)),
            Box::new(RigidBody::fixed()),
            Box::new(Collider::cuboid(Vec3::new(6.0, 0.5, 6.0))),
            Box::new(MeshRef("plane".into())),
            Box::new(MaterialRef("ground".into())),
            Box::new(Visible),
        ]);

        let player = registry.create_entity_with(vec![
            Box::new(Transform3D::from_xyz(0.0, 1.0, 0.0)),
            Box::new(RigidBody::kinematic()),
            // Props pass through the player.
            Box::new(Collider::sphere(0.5).with_mask(CollisionClass::DEFAULT)),
            Box::new(PlayerControl { speed: 3.0 }),
            Box::new(MeshRef("capsule".into())),
            Box::new(Visible),
        ]);

        debug!(
            %camera, %cube, %moon, %ball, %floor, %player,
            "demo scene populated"
        );
    }
}

impl GameState for DemoState {
    fn name(&self) -> &'static str {
        "DemoState"
    }

    fn setup<'a>(&'a mut self, world: &'a mut World) -> BoxFuture<'a, anyhow::Result<()>> {
        async move {
            Self::populate(world.registry_mut());

            let stats = Arc::clone(&self.stats);
            world.context_mut().collision_events.add_listener(
                CollisionEventType::CollisionStart,
                None,
                move |event: &CollisionEvent| {
                    stats.collisions.fetch_add(1, Ordering::Relaxed);
                    info!(a = %event.a, b = %event.b, "collision started");
                },
            );

            let physics = PhysicsSystem::new(OverlapBackend::new(), world.collision_sender());
            let registry = world.registry_mut();
            registry.add_system(physics);
            registry.add_system(PlayerControlSystem::new());
            registry.add_system(RotatingSystem::new());
            registry.add_system(TransformPropagationSystem::new());
            registry.add_system(RenderSystem::new(LoggingBackend {
                stats: Arc::clone(&self.stats),
            }));
            Ok(())
        }
        .boxed()
    }

    fn teardown(&mut self, _world: &mut World) {
        info!(
            frames = self.stats.frames(),
            collisions = self.stats.collisions(),
            "demo finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use engine_ecs::Entity;
    use engine_input::{InputEvent, KeyCode};
    use engine_math::Quat;
    use engine_physics::BodyKind;
    use engine_scene::ParentEntity;

    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::{Engine, StateStatus};

    async fn demo_engine() -> (Engine, Arc<DemoStats>) {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let demo = DemoState::new();
        let stats = demo.stats();
        assert_eq!(engine.set_state(demo).await.unwrap(), &StateStatus::Ready);
        (engine, stats)
    }

    /// The single entity carrying `T` that satisfies `pred`.
    fn find<T: Component>(engine: &Engine, pred: impl Fn(&T) -> bool) -> Entity {
        let registry = engine.world().registry();
        let found: Vec<Entity> = Query::new()
            .with::<T>()
            .execute(registry)
            .into_iter()
            .filter(|&e| registry.get_component::<T>(e).is_some_and(&pred))
            .collect();
        assert_eq!(found.len(), 1, "expected one {} match", T::type_name());
        found[0]
    }

    fn position(engine: &Engine, entity: Entity) -> Vec3 {
        engine
            .world()
            .registry()
            .get_component::<Transform3D>(entity)
            .unwrap()
            .position
    }

    #[tokio::test]
    async fn test_demo_scene_runs() {
        let (mut engine, stats) = demo_engine().await;
        let cube = find::<Rotating>(&engine, |_| true);
        let ball = find::<RigidBody>(&engine, |b| b.kind == BodyKind::Dynamic);
        let floor = find::<RigidBody>(&engine, |b| b.kind == BodyKind::Static);

        for _ in 0..60 {
            engine.frame(1.0 / 60.0).await;
        }

        assert_eq!(stats.frames(), 60);
        assert_eq!(stats.draw_items(), 5);

        let registry = engine.world().registry();
        let cube_transform = registry.get_component::<Transform3D>(cube).unwrap();
        assert_eq!(cube_transform.position, Vec3::new(0.0, 0.0, -3.0));
        assert!(!cube_transform.rotation.abs_diff_eq(Quat::IDENTITY, 1e-3));

        assert!(position(&engine, ball).y < 3.0);
        assert_eq!(position(&engine, floor), Vec3::new(0.0, -1.0, -3.0));
    }

    #[tokio::test]
    async fn test_ball_hits_floor() {
        let (mut engine, stats) = demo_engine().await;
        // Ball bottom starts 3 m above the floor top; free fall takes under a second.
        for _ in 0..90 {
            engine.frame(1.0 / 60.0).await;
        }
        assert!(stats.collisions() >= 1);
    }

    #[tokio::test]
    async fn test_player_follows_movement_actions() {
        let (mut engine, _) = demo_engine().await;
        let player = find::<PlayerControl>(&engine, |_| true);
        let sender = engine.world().input_sender();

        sender.broadcast(InputEvent::KeyDown(KeyCode::KeyD));
        for _ in 0..11 {
            engine.frame(0.1).await;
        }
        sender.broadcast(InputEvent::KeyUp(KeyCode::KeyD));
        engine.frame(0.1).await;
        engine.frame(0.1).await;
        let stopped = position(&engine, player);
        engine.frame(0.1).await;

        let now = position(&engine, player);
        assert!(now.x > 2.0, "player at {now:?}");
        assert_eq!(now.y, 1.0);
        assert_eq!(now, stopped);
    }

    #[tokio::test]
    async fn test_moon_follows_cube() {
        let (mut engine, _) = demo_engine().await;
        let moon = find::<ParentEntity>(&engine, |_| true);
        for _ in 0..10 {
            engine.frame(0.1).await;
        }
        let moon = engine_scene::world_transform(engine.world().registry(), moon).unwrap();
        let distance = (moon.position - Vec3::new(0.0, 0.0, -3.0)).length();
        assert!((distance - 1.5).abs() < 1e-4);
    }
}
