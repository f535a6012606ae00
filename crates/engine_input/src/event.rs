//! Typed input events produced by the platform bridge.

use engine_event::Event;
use serde::{Deserialize, Serialize};

use crate::keys::{InputCode, KeyCode, MouseButton};

/// Primary discriminator of an [`InputEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEventType {
    KeyDown,
    KeyUp,
    MouseMove,
    MouseDown,
    MouseUp,
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
}

impl InputEventType {
    pub const ALL: [InputEventType; 9] = [
        Self::KeyDown,
        Self::KeyUp,
        Self::MouseMove,
        Self::MouseDown,
        Self::MouseUp,
        Self::Wheel,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
    ];
}

/// Whether a key or button went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// A single native input event, already translated into engine terms.
///
/// Positions are in canvas pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseMove { x: f32, y: f32 },
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    Wheel { delta: f32 },
    TouchStart { id: u32, x: f32, y: f32 },
    TouchMove { id: u32, x: f32, y: f32 },
    TouchEnd { id: u32 },
}

impl InputEvent {
    /// The key or button this event changes, with its new state.
    #[must_use]
    pub fn button(&self) -> Option<(InputCode, ButtonState)> {
        match *self {
            Self::KeyDown(k) => Some((k.into(), ButtonState::Pressed)),
            Self::KeyUp(k) => Some((k.into(), ButtonState::Released)),
            Self::MouseDown(b) => Some((b.into(), ButtonState::Pressed)),
            Self::MouseUp(b) => Some((b.into(), ButtonState::Released)),
            _ => None,
        }
    }
}

impl Event for InputEvent {
    type Type = InputEventType;
    type SubType = InputCode;

    fn event_type(&self) -> InputEventType {
        match self {
            Self::KeyDown(_) => InputEventType::KeyDown,
            Self::KeyUp(_) => InputEventType::KeyUp,
            Self::MouseMove { .. } => InputEventType::MouseMove,
            Self::MouseDown(_) => InputEventType::MouseDown,
            Self::MouseUp(_) => InputEventType::MouseUp,
            Self::Wheel { .. } => InputEventType::Wheel,
            Self::TouchStart { .. } => InputEventType::TouchStart,
            Self::TouchMove { .. } => InputEventType::TouchMove,
            Self::TouchEnd { .. } => InputEventType::TouchEnd,
        }
    }

    fn sub_type(&self) -> Option<InputCode> {
        self.button().map(|(code, _)| code)
    }
}
