//! Rigid-body and collider components.
//!
//! Attach a [`RigidBody`] alongside a [`Transform3D`](engine_math::Transform3D)
//! to give an entity physical behaviour, and a [`Collider`] to make it take
//! part in contact detection and ray casts.

use engine_ecs::Component;
use engine_math::Vec3;
use serde::{Deserialize, Serialize};

/// How a body responds to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Affected by gravity and velocity.
    Dynamic,
    /// Moved only by its own velocity.
    Kinematic,
    /// Never moves.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub kind: BodyKind,
    /// Kilograms. Ignored for non-dynamic bodies.
    pub mass: f32,
    /// Metres per second, world space.
    pub velocity: Vec3,
    pub gravity_scale: f32,
}

impl RigidBody {
    /// A dynamic body of the given mass.
    #[must_use]
    pub fn dynamic(mass: f32) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass,
            velocity: Vec3::ZERO,
            gravity_scale: 1.0,
        }
    }

    #[must_use]
    pub fn kinematic() -> Self {
        Self {
            kind: BodyKind::Kinematic,
            gravity_scale: 0.0,
            ..Self::dynamic(0.0)
        }
    }

    /// A fixed body that never moves.
    #[must_use]
    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            gravity_scale: 0.0,
            ..Self::dynamic(0.0)
        }
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Returns `true` if the simulation may change this body's transform.
    #[must_use]
    pub fn is_movable(&self) -> bool {
        self.kind != BodyKind::Static
    }
}

impl Component for RigidBody {
    fn type_name() -> &'static str {
        "RigidBody"
    }
}

/// Collision group bits. A pair collides only if each side's mask contains
/// the other side's class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionClass(pub u32);

impl CollisionClass {
    pub const NONE: Self = Self(0);
    pub const DEFAULT: Self = Self(1);
    pub const ALL: Self = Self(u32::MAX);

    /// The class with only bit `n` set (`n < 32`).
    #[must_use]
    pub const fn bit(n: u32) -> Self {
        Self(1 << n)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for CollisionClass {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Axis-aligned in the body's space; rotation is not applied.
    Cuboid { half_extents: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub class: CollisionClass,
    pub mask: CollisionClass,
}

impl Collider {
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            class: CollisionClass::DEFAULT,
            mask: CollisionClass::ALL,
        }
    }

    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Cuboid { half_extents },
            ..Self::sphere(0.0)
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: CollisionClass) -> Self {
        self.class = class;
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: CollisionClass) -> Self {
        self.mask = mask;
        self
    }

    /// Returns `true` if both colliders' masks accept each other's class.
    #[must_use]
    pub fn accepts(&self, other: &Collider) -> bool {
        self.mask.intersects(other.class) && other.mask.intersects(self.class)
    }
}

impl Component for Collider {
    fn type_name() -> &'static str {
        "Collider"
    }
}
