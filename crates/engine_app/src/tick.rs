//! Host tick loop.
//!
//! Drives [`Engine::frame`] at the configured rate on a tokio interval:
//!
//! 1. Wait for the next interval tick.
//! 2. Measure the wall-clock delta since the previous frame.
//! 3. Run the frame (the engine clamps the delta).
//! 4. Warn if the frame took longer than its budget.
//! 5. Stop after `max_ticks` frames, or when the shutdown future resolves.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::engine::Engine;

#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    engine: Engine,
}

impl TickLoop {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self { tick_id: 0, engine }
    }

    /// Ticks run so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn into_engine(self) -> Engine {
        self.engine
    }

    /// Run until `max_ticks` is reached. With `max_ticks == 0` this never
    /// returns; use [`run_until`](Self::run_until) instead.
    pub async fn run(&mut self) -> u64 {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until `shutdown` resolves or `max_ticks` is reached. Returns the
    /// number of ticks run by this call.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> u64 {
        let config = self.engine.config();
        let budget = Duration::from_secs_f64(config.tick_interval());
        let max_ticks = config.max_ticks;

        info!(
            tick_rate = config.tick_rate,
            max_ticks,
            "starting tick loop"
        );

        let mut interval = tokio::time::interval(budget);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut ran = 0u64;
        let mut last = Instant::now();
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(ticks = ran, "shutdown requested");
                    break;
                }
                _ = interval.tick() => {}
            }

            let start = Instant::now();
            // The first frame has no predecessor; it advances by the nominal interval.
            let delta = if ran == 0 {
                budget.as_secs_f32()
            } else {
                start.duration_since(last).as_secs_f32()
            };
            last = start;

            let ticked = self.engine.frame(delta).await;
            self.tick_id += 1;
            ran += 1;
            debug!(tick_id = self.tick_id, delta, ticked, "tick");

            let elapsed = start.elapsed();
            if elapsed > budget {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = budget.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }

            if max_ticks > 0 && self.tick_id >= max_ticks {
                info!(ticks = self.tick_id, "tick loop complete");
                break;
            }
        }
        ran
    }
}
