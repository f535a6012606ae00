//! # engine_input
//!
//! Translates platform input into engine terms and answers gameplay questions
//! about it.
//!
//! - [`InputEvent`] — typed key, mouse, wheel and touch events, routed through
//!   an [`EventQueue`](engine_event::EventQueue) with the key or button as the
//!   sub-type.
//! - [`KeyCode`] / [`MouseButton`] / [`InputCode`] — physical identifiers,
//!   parsed from DOM code strings.
//! - [`InputManager`] — action bindings and per-frame pressed/released state.

pub mod error;
pub mod event;
pub mod keys;
pub mod manager;
pub mod state;

pub use error::InputError;
pub use event::{ButtonState, InputEvent, InputEventType};
pub use keys::{InputCode, KeyCode, MouseButton};
pub use manager::{InputManager, Touch};
pub use state::ButtonSet;
