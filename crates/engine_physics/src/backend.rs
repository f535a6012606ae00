//! The physics backend contract and the built-in overlap backend.
//!
//! The engine never solves constraints itself. Each tick the
//! [`PhysicsSystem`](crate::PhysicsSystem) hands the backend a snapshot of
//! every body, awaits a [`StepOutput`], and writes the results back.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::trace;

use engine_ecs::Entity;
use engine_math::{Transform3D, Vec3};

use crate::components::{BodyKind, Collider, ColliderShape, RigidBody};

/// One body as seen by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub entity: Entity,
    pub transform: Transform3D,
    pub body: RigidBody,
    pub collider: Option<Collider>,
}

/// Result of a simulation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    /// New transforms for bodies that moved.
    pub transforms: Vec<(Entity, Transform3D)>,
    /// New velocities for bodies whose velocity changed.
    pub velocities: Vec<(Entity, Vec3)>,
    /// Every touching pair after the step, lower id first.
    pub contacts: Vec<(Entity, Entity)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
}

/// A physics engine the [`PhysicsSystem`](crate::PhysicsSystem) can drive.
///
/// Both operations return futures so that a backend living in another
/// thread or process can be awaited without blocking the tick.
pub trait PhysicsBackend: Send {
    /// Advance the simulation by `delta` seconds.
    fn step<'a>(&'a mut self, bodies: &'a [BodyState], delta: f32) -> BoxFuture<'a, StepOutput>;

    /// Nearest collider hit along a ray, within `max_distance`, against the
    /// state produced by the last `step`.
    fn cast_ray<'a>(
        &'a self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> BoxFuture<'a, Option<RayHit>>;
}

/// Reference backend: explicit Euler integration plus pairwise overlap tests.
///
/// Dynamic bodies accelerate under gravity; kinematic bodies follow their
/// velocity; static bodies stay put. Contacts are reported for overlapping
/// collider pairs whose classes accept each other. Penetration is not
/// resolved.
#[derive(Debug, Clone)]
pub struct OverlapBackend {
    gravity: Vec3,
    snapshot: Vec<BodyState>,
}

impl OverlapBackend {
    pub const EARTH_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    #[must_use]
    pub fn new() -> Self {
        Self::with_gravity(Self::EARTH_GRAVITY)
    }

    #[must_use]
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            snapshot: Vec::new(),
        }
    }

    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Synchronous core of [`PhysicsBackend::step`].
    pub fn step_now(&mut self, bodies: &[BodyState], delta: f32) -> StepOutput {
        let mut output = StepOutput::default();
        self.snapshot.clear();

        for state in bodies {
            let mut state = *state;
            let before = state.transform;
            match state.body.kind {
                BodyKind::Dynamic => {
                    let velocity = state.body.velocity + self.gravity * state.body.gravity_scale * delta;
                    if velocity != state.body.velocity {
                        output.velocities.push((state.entity, velocity));
                    }
                    state.body.velocity = velocity;
                    state.transform.position += velocity * delta;
                }
                BodyKind::Kinematic => state.transform.position += state.body.velocity * delta,
                BodyKind::Static => {}
            }
            if state.transform != before {
                output.transforms.push((state.entity, state.transform));
            }
            self.snapshot.push(state);
        }

        for (i, a) in self.snapshot.iter().enumerate() {
            for b in &self.snapshot[i + 1..] {
                if a.body.kind == BodyKind::Static && b.body.kind == BodyKind::Static {
                    continue;
                }
                let (Some(ca), Some(cb)) = (a.collider, b.collider) else {
                    continue;
                };
                if ca.accepts(&cb) && overlaps(&a.transform, &ca, &b.transform, &cb) {
                    let pair = if a.entity < b.entity {
                        (a.entity, b.entity)
                    } else {
                        (b.entity, a.entity)
                    };
                    output.contacts.push(pair);
                }
            }
        }
        output.contacts.sort_unstable();

        trace!(
            bodies = bodies.len(),
            moved = output.transforms.len(),
            contacts = output.contacts.len(),
            "physics step"
        );
        output
    }

    /// Synchronous core of [`PhysicsBackend::cast_ray`].
    #[must_use]
    pub fn cast_ray_now(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let dir = direction.try_normalize()?;
        self.snapshot
            .iter()
            .filter_map(|state| {
                let collider = state.collider?;
                let distance = ray_distance(origin, dir, &state.transform, &collider)?;
                (distance <= max_distance).then_some(RayHit {
                    entity: state.entity,
                    distance,
                    point: origin + dir * distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl Default for OverlapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for OverlapBackend {
    fn step<'a>(&'a mut self, bodies: &'a [BodyState], delta: f32) -> BoxFuture<'a, StepOutput> {
        futures::future::ready(self.step_now(bodies, delta)).boxed()
    }

    fn cast_ray<'a>(
        &'a self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> BoxFuture<'a, Option<RayHit>> {
        futures::future::ready(self.cast_ray_now(origin, direction, max_distance)).boxed()
    }
}

/// World-space bounds of a collider as (centre, half extents) or (centre, radius).
enum Bounds {
    Sphere { center: Vec3, radius: f32 },
    Aabb { center: Vec3, half: Vec3 },
}

fn bounds(transform: &Transform3D, collider: &Collider) -> Bounds {
    let scale = transform.scale.abs();
    match collider.shape {
        ColliderShape::Sphere { radius } => Bounds::Sphere {
            center: transform.position,
            radius: radius * scale.max_element(),
        },
        ColliderShape::Cuboid { half_extents } => Bounds::Aabb {
            center: transform.position,
            half: half_extents * scale,
        },
    }
}

fn overlaps(ta: &Transform3D, ca: &Collider, tb: &Transform3D, cb: &Collider) -> bool {
    match (bounds(ta, ca), bounds(tb, cb)) {
        (Bounds::Sphere { center: c1, radius: r1 }, Bounds::Sphere { center: c2, radius: r2 }) => {
            c1.distance_squared(c2) <= (r1 + r2) * (r1 + r2)
        }
        (Bounds::Aabb { center: c1, half: h1 }, Bounds::Aabb { center: c2, half: h2 }) => {
            let d = (c1 - c2).abs();
            d.cmple(h1 + h2).all()
        }
        (Bounds::Sphere { center, radius }, Bounds::Aabb { center: bc, half })
        | (Bounds::Aabb { center: bc, half }, Bounds::Sphere { center, radius }) => {
            let closest = center.clamp(bc - half, bc + half);
            closest.distance_squared(center) <= radius * radius
        }
    }
}

/// Distance along a normalised ray to the collider surface, or `None` on a
/// miss. A ray starting inside a shape hits at distance 0.
fn ray_distance(origin: Vec3, dir: Vec3, transform: &Transform3D, collider: &Collider) -> Option<f32> {
    match bounds(transform, collider) {
        Bounds::Sphere { center, radius } => {
            let to_origin = origin - center;
            let b = to_origin.dot(dir);
            let c = to_origin.length_squared() - radius * radius;
            if c <= 0.0 {
                return Some(0.0);
            }
            let disc = b * b - c;
            if b > 0.0 || disc < 0.0 {
                return None;
            }
            Some(-b - disc.sqrt())
        }
        Bounds::Aabb { center, half } => {
            let min = center - half;
            let max = center + half;
            let mut t_near = 0.0_f32;
            let mut t_far = f32::INFINITY;
            for axis in 0..3 {
                let (o, d) = (origin[axis], dir[axis]);
                if d.abs() < f32::EPSILON {
                    if o < min[axis] || o > max[axis] {
                        return None;
                    }
                    continue;
                }
                let t1 = (min[axis] - o) / d;
                let t2 = (max[axis] - o) / d;
                t_near = t_near.max(t1.min(t2));
                t_far = t_far.min(t1.max(t2));
                if t_near > t_far {
                    return None;
                }
            }
            Some(t_near)
        }
    }
}
