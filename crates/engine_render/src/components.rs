//! Components read by the render system.

use engine_ecs::Component;
use engine_math::Mat4;
use serde::{Deserialize, Serialize};

/// Names the mesh asset an entity draws.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshRef(pub String);

impl Component for MeshRef {
    fn type_name() -> &'static str {
        "MeshRef"
    }
}

/// Names the material asset an entity draws with. Entities without one use
/// the backend's default material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRef(pub String);

impl Component for MaterialRef {
    fn type_name() -> &'static str {
        "MaterialRef"
    }
}

/// Marker: only entities carrying it are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visible;

impl Component for Visible {
    fn type_name() -> &'static str {
        "Visible"
    }
}

/// Perspective camera. The view comes from the entity's world transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Width over height.
    pub aspect: f32,
    /// Only the first active camera (in creation order) is used.
    pub active: bool,
}

impl Camera {
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect.max(f32::EPSILON), self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y: 60.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            active: true,
        }
    }
}

impl Component for Camera {
    fn type_name() -> &'static str {
        "Camera"
    }
}
