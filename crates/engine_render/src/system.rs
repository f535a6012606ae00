//! The rendering backend contract and the system that feeds it.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::trace;

use engine_ecs::{Priority, Registry, System};

use crate::frame::{Frame, FrameCollector};

/// A renderer the [`RenderSystem`] hands frames to.
///
/// The backend owns all GPU state. It must not touch gameplay components.
pub trait RenderBackend: Send {
    fn submit(&mut self, frame: &Frame);
}

/// Backend that draws nothing and keeps the most recent frame, for headless
/// runs and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    frames: u64,
    last: Option<Frame>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames submitted so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }
}

impl RenderBackend for HeadlessBackend {
    fn submit(&mut self, frame: &Frame) {
        self.frames += 1;
        self.last = Some(frame.clone());
    }
}

/// Extracts a [`Frame`] at [`Priority::Last`] and submits it.
pub struct RenderSystem<R> {
    backend: R,
    collector: FrameCollector,
}

impl<R: RenderBackend> RenderSystem<R> {
    pub fn new(backend: R) -> Self {
        Self {
            backend,
            collector: FrameCollector::new(),
        }
    }

    pub fn backend(&self) -> &R {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut R {
        &mut self.backend
    }
}

impl<W: Send, R: RenderBackend> System<W> for RenderSystem<R> {
    fn name(&self) -> &'static str {
        "RenderSystem"
    }

    fn priority(&self) -> Priority {
        Priority::Last
    }

    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<W>,
        _world: &'a mut W,
        _delta: f32,
    ) -> BoxFuture<'a, ()> {
        let frame = self.collector.collect(registry);
        trace!(items = frame.items.len(), camera = ?frame.camera, "frame submitted");
        self.backend.submit(&frame);
        futures::future::ready(()).boxed()
    }
}
