//! Engine facade: configuration, the active game state and the frame clock.

use futures::future::BoxFuture;
use tracing::{debug, error, info};

use crate::config::{ConfigError, EngineConfig};
use crate::world::World;

/// A game mode that populates the world.
///
/// `setup` may suspend (asset loading, backend initialisation). If it fails
/// the state never becomes [`StateStatus::Ready`] and the world is not ticked.
pub trait GameState: Send {
    fn name(&self) -> &'static str;

    fn setup<'a>(&'a mut self, world: &'a mut World) -> BoxFuture<'a, anyhow::Result<()>>;

    /// Called before the state is replaced.
    fn teardown(&mut self, _world: &mut World) {}
}

/// Lifecycle of the active [`GameState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateStatus {
    /// No state set yet, or `setup` is in progress.
    Loading,
    Ready,
    /// `setup` returned an error; the message is kept for display.
    Failed(String),
}

pub struct Engine {
    config: EngineConfig,
    world: World,
    state: Option<Box<dyn GameState>>,
    status: StateStatus,
    frames: u64,
}

impl Engine {
    /// Build an engine whose world has the configured input bindings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config is out of range or names an
    /// unknown input code.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = Self::fresh_world(&config)?;
        info!(
            tick_rate = config.tick_rate,
            max_delta = config.max_delta,
            actions = config.bindings.len(),
            "engine created"
        );
        Ok(Self {
            config,
            world,
            state: None,
            status: StateStatus::Loading,
            frames: 0,
        })
    }

    fn fresh_world(config: &EngineConfig) -> Result<World, ConfigError> {
        let world = World::new();
        world.input().load_bindings(&config.bindings)?;
        Ok(world)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn status(&self) -> &StateStatus {
        &self.status
    }

    /// Name of the active state, if any.
    pub fn state_name(&self) -> Option<&'static str> {
        self.state.as_ref().map(|s| s.name())
    }

    /// Frames actually simulated (frames skipped while not ready excluded).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Replace the active state. The previous state is torn down and the new
    /// one is set up in a fresh world.
    ///
    /// Returns the resulting status; a setup error is logged and reported as
    /// [`StateStatus::Failed`], not propagated.
    ///
    /// # Errors
    ///
    /// Only if the fresh world cannot be configured.
    pub async fn set_state(
        &mut self,
        state: impl GameState + 'static,
    ) -> Result<&StateStatus, ConfigError> {
        self.shutdown();
        self.world = Self::fresh_world(&self.config)?;

        let mut state: Box<dyn GameState> = Box::new(state);
        info!(state = state.name(), "loading state");
        match state.setup(&mut self.world).await {
            Ok(()) => {
                info!(
                    state = state.name(),
                    entities = self.world.registry().entity_count(),
                    systems = self.world.registry().system_count(),
                    "state ready"
                );
                self.status = StateStatus::Ready;
            }
            Err(err) => {
                let message = format!("{err:#}");
                error!(state = state.name(), error = %message, "state setup failed");
                self.status = StateStatus::Failed(message);
            }
        }
        self.state = Some(state);
        Ok(&self.status)
    }

    /// Tear down the active state, leaving the engine in `Loading`.
    pub fn shutdown(&mut self) {
        if let Some(mut state) = self.state.take() {
            debug!(state = state.name(), "tearing down state");
            state.teardown(&mut self.world);
        }
        self.status = StateStatus::Loading;
    }

    /// Clamp a host-measured delta to `[0, max_delta]`. NaN counts as 0.
    #[must_use]
    pub fn clamp_delta(&self, delta: f32) -> f32 {
        if delta.is_nan() {
            return 0.0;
        }
        delta.clamp(0.0, self.config.max_delta)
    }

    /// Advance one frame. Returns `false` without touching the world while
    /// the state is not [`StateStatus::Ready`].
    pub async fn frame(&mut self, delta: f32) -> bool {
        if self.status != StateStatus::Ready {
            return false;
        }
        let delta = self.clamp_delta(delta);
        self.world.update(delta).await;
        self.frames += 1;
        true
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("state", &self.state_name())
            .field("status", &self.status)
            .field("frames", &self.frames)
            .field("world", &self.world)
            .finish()
    }
}
