//! The [`System`] contract.
//!
//! A system is a stateful unit of per-tick logic. It is constructed once,
//! captures whatever [`Query`](crate::Query) values and collaborator handles it
//! needs, and is then driven by the registry every tick.
//!
//! `update` returns a boxed future so a system can await a slow external
//! operation (a physics ray query, say). The registry awaits it to completion
//! before moving on, so from the point of view of other systems every update
//! is atomic.

use std::marker::PhantomData;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::registry::Registry;

/// Ordering bucket for a system within a tick. Lower runs first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    First = 0,
    PreUpdate = 1,
    #[default]
    Update = 2,
    PostUpdate = 3,
    Last = 4,
}

/// Per-tick logic operating on the registry.
///
/// `W` is the world context handed to every system alongside the registry:
/// event queues, input state, clocks, whatever the host application bundles.
///
/// Systems must tolerate inconsistent entities (a component missing despite
/// the query, an entity removed by an earlier system) by skipping them, never
/// by aborting the pass.
pub trait System<W>: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Read once when the system is added.
    fn priority(&self) -> Priority {
        Priority::Update
    }

    /// Run one tick. `delta` is the elapsed time in seconds, never negative.
    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<W>,
        world: &'a mut W,
        delta: f32,
    ) -> BoxFuture<'a, ()>;
}

/// Adapter turning a synchronous closure into a [`System`].
///
/// ```rust
/// use engine_ecs::{FnSystem, Priority, Registry};
///
/// let mut registry: Registry<()> = Registry::new();
/// registry.add_system(FnSystem::new("noop", Priority::Last, |_reg, _world, _dt| {}));
/// ```
pub struct FnSystem<W, F> {
    name: &'static str,
    priority: Priority,
    f: F,
    _world: PhantomData<fn(&mut W)>,
}

impl<W, F> FnSystem<W, F> {
    pub fn new(name: &'static str, priority: Priority, f: F) -> Self
    where
        F: FnMut(&mut Registry<W>, &mut W, f32),
    {
        Self {
            name,
            priority,
            f,
            _world: PhantomData,
        }
    }
}

impl<W, F> System<W> for FnSystem<W, F>
where
    W: Send,
    F: FnMut(&mut Registry<W>, &mut W, f32) + Send,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<W>,
        world: &'a mut W,
        delta: f32,
    ) -> BoxFuture<'a, ()> {
        (self.f)(registry, world, delta);
        futures::future::ready(()).boxed()
    }
}

/// Strip the module path from a fully-qualified type name, keeping generic
/// arguments intact (`engine_scene::rotate::RotatingSystem` → `RotatingSystem`).
fn short_type_name(full: &'static str) -> &'static str {
    let base_end = full.find('<').unwrap_or(full.len());
    let start = full[..base_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}
