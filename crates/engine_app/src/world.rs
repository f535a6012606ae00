//! The world: a registry plus the context its systems share.
//!
//! ```text
//! World::update(delta)
//!   1. input_events.update()      deliver last frame's input to the InputManager
//!   2. collision_events.update()  deliver last frame's collisions to listeners
//!   3. time.advance(delta)
//!   4. registry.update(ctx, delta) run every system in priority order
//!   5. input.end_frame()          clear just-pressed / deltas
//! ```

use engine_ecs::Registry;
use engine_event::{EventQueue, EventSender};
use engine_input::{InputEvent, InputManager};
use engine_physics::CollisionEvent;
use tracing::trace;

/// Frame timing visible to systems.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Time {
    /// Seconds covered by the current tick (already clamped).
    pub delta: f32,
    /// Seconds since the world was created, summed over ticks.
    pub elapsed: f64,
    /// Ticks completed before the current one.
    pub frame: u64,
}

impl Time {
    fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += f64::from(delta);
    }
}

/// State shared by all systems of a world, passed to each as `world`.
#[derive(Debug)]
pub struct WorldContext {
    pub input_events: EventQueue<InputEvent>,
    pub collision_events: EventQueue<CollisionEvent>,
    pub input: InputManager,
    pub time: Time,
}

impl WorldContext {
    fn new() -> Self {
        let mut input_events = EventQueue::new();
        let input = InputManager::new();
        input.attach(&mut input_events);
        Self {
            input_events,
            collision_events: EventQueue::new(),
            input,
            time: Time::default(),
        }
    }
}

/// A registry of entities and systems together with their shared context.
#[derive(Debug)]
pub struct World {
    registry: Registry<WorldContext>,
    context: WorldContext,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            context: WorldContext::new(),
        }
    }

    pub fn registry(&self) -> &Registry<WorldContext> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<WorldContext> {
        &mut self.registry
    }

    pub fn context(&self) -> &WorldContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut WorldContext {
        &mut self.context
    }

    /// Handle to the world's input manager.
    pub fn input(&self) -> &InputManager {
        &self.context.input
    }

    /// Producer handle for the platform input bridge.
    pub fn input_sender(&self) -> EventSender<InputEvent> {
        self.context.input_events.sender()
    }

    /// Producer handle for a physics system.
    pub fn collision_sender(&self) -> EventSender<CollisionEvent> {
        self.context.collision_events.sender()
    }

    pub fn time(&self) -> Time {
        self.context.time
    }

    /// Run one tick. `delta` must already be clamped to a non-negative value.
    pub async fn update(&mut self, delta: f32) {
        let input = self.context.input_events.update();
        let collisions = self.context.collision_events.update();
        self.context.time.advance(delta);
        trace!(
            frame = self.context.time.frame,
            delta,
            input,
            collisions,
            "world update"
        );

        self.registry.update(&mut self.context, delta).await;

        self.context.input.end_frame();
        self.context.time.frame += 1;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
