//! Constant angular velocity.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use engine_ecs::{Component, Priority, Query, Registry, System};
use engine_math::{EulerRot, Quat, Transform3D, Vec3};

/// Spins an entity about its local axes. `speed` is radians per second per
/// axis, applied in X, Y, Z order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotating {
    pub speed: Vec3,
}

impl Rotating {
    #[must_use]
    pub fn new(speed: Vec3) -> Self {
        Self { speed }
    }

    /// The rotation accumulated over `delta` seconds.
    #[must_use]
    pub fn step(&self, delta: f32) -> Quat {
        let angle = self.speed * delta;
        Quat::from_euler(EulerRot::XYZ, angle.x, angle.y, angle.z)
    }
}

impl Component for Rotating {
    fn type_name() -> &'static str {
        "Rotating"
    }
}

/// Advances the [`Transform3D`] of every [`Rotating`] entity.
#[derive(Debug)]
pub struct RotatingSystem {
    query: Query,
}

impl RotatingSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: Query::new().with::<Transform3D>().with::<Rotating>(),
        }
    }
}

impl Default for RotatingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Send> System<W> for RotatingSystem {
    fn update<'a>(
        &'a mut self,
        registry: &'a mut Registry<W>,
        _world: &'a mut W,
        delta: f32,
    ) -> BoxFuture<'a, ()> {
        if delta > 0.0 {
            for entity in self.query.execute(registry) {
                let Some(components) = registry.get_components_mut(entity) else {
                    continue;
                };
                let Some(step) = components.get::<Rotating>().map(|r| r.step(delta)) else {
                    continue;
                };
                if let Some(transform) = components.get_mut::<Transform3D>() {
                    transform.rotation = (transform.rotation * step).normalize();
                }
            }
        }
        futures::future::ready(()).boxed()
    }

    fn priority(&self) -> Priority {
        Priority::Update
    }
}
