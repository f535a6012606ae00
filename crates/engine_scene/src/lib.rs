//! # engine_scene
//!
//! Scene-graph helpers on top of the registry:
//!
//! - [`ParentEntity`] / [`GlobalTransform`] — hierarchy components.
//! - [`world_transform`] — resolve an entity's transform through its parents,
//!   and [`local_from_world`] to go back.
//! - [`TransformPropagationSystem`] — writes `GlobalTransform` each tick.
//! - [`Rotating`] / [`RotatingSystem`] — constant angular velocity.

pub mod hierarchy;
pub mod rotate;

pub use hierarchy::{
    GlobalTransform, ParentEntity, TransformPropagationSystem, children_of, clear_parent, depth,
    local_from_world, remove_recursive, set_parent, world_transform,
};
pub use rotate::{Rotating, RotatingSystem};
