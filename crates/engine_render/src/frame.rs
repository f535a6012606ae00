//! # Frame extraction
//!
//! Each tick the render system turns registry state into a [`Frame`]: the
//! active camera's view and projection plus one [`DrawItem`] per visible
//! mesh entity. Extraction only reads components.
//!
//! Draw items are sorted by material, then mesh, then entity, so a backend
//! can bind each material once per frame.

use engine_ecs::{Entity, Query, Registry};
use engine_math::{Mat4, Vec3};
use engine_scene::world_transform;
use serde::{Deserialize, Serialize};

use crate::components::{Camera, MaterialRef, MeshRef, Visible};

/// A single draw command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawItem {
    pub entity: Entity,
    pub mesh: String,
    /// `None` selects the backend's default material.
    pub material: Option<String>,
    /// Model-to-world matrix.
    pub model: Mat4,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera: Option<Entity>,
    pub camera_position: Vec3,
    pub items: Vec<DrawItem>,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            camera: None,
            camera_position: Vec3::ZERO,
            items: Vec::new(),
        }
    }
}

impl Frame {
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Number of material changes a backend performs drawing the items in
    /// order.
    #[must_use]
    pub fn material_switches(&self) -> usize {
        self.items
            .windows(2)
            .filter(|w| w[0].material != w[1].material)
            .count()
            + usize::from(!self.items.is_empty())
    }
}

/// Reusable queries for extraction.
#[derive(Debug, Clone)]
pub struct FrameCollector {
    cameras: Query,
    drawables: Query,
}

impl FrameCollector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cameras: Query::new().with::<Camera>(),
            drawables: Query::new().with::<MeshRef>().with::<Visible>(),
        }
    }

    /// Build a frame from the current registry state.
    #[must_use]
    pub fn collect<W>(&self, registry: &Registry<W>) -> Frame {
        let mut frame = Frame::default();

        let active = self.cameras.execute(registry).into_iter().find_map(|e| {
            let camera = registry.get_component::<Camera>(e)?;
            camera.active.then_some((e, *camera))
        });
        if let Some((entity, camera)) = active {
            let transform = world_transform(registry, entity).unwrap_or_default();
            frame.view = transform.to_matrix().inverse();
            frame.projection = camera.projection();
            frame.camera = Some(entity);
            frame.camera_position = transform.position;
        }

        frame.items = self
            .drawables
            .execute(registry)
            .into_iter()
            .filter_map(|entity| {
                let mesh = registry.get_component::<MeshRef>(entity)?.0.clone();
                let material = registry
                    .get_component::<MaterialRef>(entity)
                    .map(|m| m.0.clone());
                let model = world_transform(registry, entity)?.to_matrix();
                Some(DrawItem {
                    entity,
                    mesh,
                    material,
                    model,
                })
            })
            .collect();
        frame.items.sort_by(|a, b| {
            (&a.material, &a.mesh, a.entity).cmp(&(&b.material, &b.mesh, b.entity))
        });
        frame
    }
}

impl Default for FrameCollector {
    fn default() -> Self {
        Self::new()
    }
}
