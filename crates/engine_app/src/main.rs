//! # engine_app — headless host
//!
//! Runs the demo scene on the fixed-rate tick loop until interrupted or
//! `max_ticks` is reached.
//!
//! ## Configuration
//!
//! Defaults, then an optional JSON config file named by the first argument,
//! then `ENGINE_TICK_RATE`, `ENGINE_MAX_TICKS` and `ENGINE_MAX_DELTA`.
//! Log filtering follows `RUST_LOG`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use engine_app::{DemoState, Engine, EngineConfig, StateStatus, TickLoop};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(path.as_deref(), |var| std::env::var(var).ok())
        .context("loading engine configuration")?;

    info!(?config, "engine starting");

    let mut engine = Engine::new(config)?;
    let demo = DemoState::new();
    let stats = demo.stats();
    if let StateStatus::Failed(reason) = engine.set_state(demo).await? {
        bail!("demo failed to load: {reason}");
    }

    let mut tick_loop = TickLoop::new(engine);
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    let ticks = tick_loop.run_until(shutdown).await;
    tick_loop.engine_mut().shutdown();

    info!(
        ticks,
        frames = stats.frames(),
        collisions = stats.collisions(),
        "engine shut down"
    );
    Ok(())
}
