//! # engine_render
//!
//! The boundary between the registry and a renderer. The engine decides
//! *what* to draw and *where*; a [`RenderBackend`] decides how.
//!
//! - [`MeshRef`], [`MaterialRef`], [`Visible`], [`Camera`] — render components.
//! - [`FrameCollector`] — extracts a sorted [`Frame`] from the registry.
//! - [`RenderSystem`] — runs at `Last` and submits the frame.

pub mod components;
pub mod frame;
pub mod system;

pub use components::{Camera, MaterialRef, MeshRef, Visible};
pub use frame::{DrawItem, Frame, FrameCollector};
pub use system::{HeadlessBackend, RenderBackend, RenderSystem};
