//! Physical key and button identifiers.
//!
//! Key names follow the DOM `KeyboardEvent.code` strings (`"KeyW"`,
//! `"ArrowUp"`, `"Space"`), which identify the physical key regardless of
//! keyboard layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

macro_rules! key_codes {
    ($($variant:ident => $code:literal),* $(,)?) => {
        /// A physical keyboard key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum KeyCode {
            $($variant,)*
        }

        impl KeyCode {
            /// Every supported key, in declaration order.
            pub const ALL: &'static [KeyCode] = &[$(KeyCode::$variant,)*];

            /// The DOM `KeyboardEvent.code` string for this key.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(KeyCode::$variant => $code,)*
                }
            }
        }

        impl FromStr for KeyCode {
            type Err = InputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(KeyCode::$variant),)*
                    other => Err(InputError::UnknownKey(other.to_string())),
                }
            }
        }
    };
}

key_codes! {
    KeyA => "KeyA", KeyB => "KeyB", KeyC => "KeyC", KeyD => "KeyD",
    KeyE => "KeyE", KeyF => "KeyF", KeyG => "KeyG", KeyH => "KeyH",
    KeyI => "KeyI", KeyJ => "KeyJ", KeyK => "KeyK", KeyL => "KeyL",
    KeyM => "KeyM", KeyN => "KeyN", KeyO => "KeyO", KeyP => "KeyP",
    KeyQ => "KeyQ", KeyR => "KeyR", KeyS => "KeyS", KeyT => "KeyT",
    KeyU => "KeyU", KeyV => "KeyV", KeyW => "KeyW", KeyX => "KeyX",
    KeyY => "KeyY", KeyZ => "KeyZ",
    Digit0 => "Digit0", Digit1 => "Digit1", Digit2 => "Digit2", Digit3 => "Digit3",
    Digit4 => "Digit4", Digit5 => "Digit5", Digit6 => "Digit6", Digit7 => "Digit7",
    Digit8 => "Digit8", Digit9 => "Digit9",
    ArrowUp => "ArrowUp", ArrowDown => "ArrowDown",
    ArrowLeft => "ArrowLeft", ArrowRight => "ArrowRight",
    Space => "Space", Enter => "Enter", Escape => "Escape", Tab => "Tab",
    Backspace => "Backspace", Delete => "Delete",
    ShiftLeft => "ShiftLeft", ShiftRight => "ShiftRight",
    ControlLeft => "ControlLeft", ControlRight => "ControlRight",
    AltLeft => "AltLeft", AltRight => "AltRight",
    MetaLeft => "MetaLeft", MetaRight => "MetaRight",
    F1 => "F1", F2 => "F2", F3 => "F3", F4 => "F4", F5 => "F5", F6 => "F6",
    F7 => "F7", F8 => "F8", F9 => "F9", F10 => "F10", F11 => "F11", F12 => "F12",
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::UnknownButton`] for indices outside `0..=4`.
    pub fn from_dom_index(index: i16) -> Result<Self, InputError> {
        match index {
            0 => Ok(Self::Left),
            1 => Ok(Self::Middle),
            2 => Ok(Self::Right),
            3 => Ok(Self::Back),
            4 => Ok(Self::Forward),
            other => Err(InputError::UnknownButton(other)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "MouseLeft",
            Self::Middle => "MouseMiddle",
            Self::Right => "MouseRight",
            Self::Back => "MouseBack",
            Self::Forward => "MouseForward",
        }
    }
}

/// Anything an action can be bound to; also the event sub-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InputCode {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl From<KeyCode> for InputCode {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for InputCode {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

impl FromStr for InputCode {
    type Err = InputError;

    /// Accepts a DOM key code or one of `MouseLeft`, `MouseMiddle`,
    /// `MouseRight`, `MouseBack`, `MouseForward`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let button = match s {
            "MouseLeft" => Some(MouseButton::Left),
            "MouseMiddle" => Some(MouseButton::Middle),
            "MouseRight" => Some(MouseButton::Right),
            "MouseBack" => Some(MouseButton::Back),
            "MouseForward" => Some(MouseButton::Forward),
            _ => None,
        };
        match button {
            Some(b) => Ok(Self::Mouse(b)),
            None => s.parse::<KeyCode>().map(Self::Key),
        }
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k.as_str()),
            Self::Mouse(b) => f.write_str(b.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dom_codes() {
        assert_eq!("KeyW".parse::<KeyCode>(), Ok(KeyCode::KeyW));
        assert_eq!("ArrowUp".parse::<KeyCode>(), Ok(KeyCode::ArrowUp));
        assert_eq!("Space".parse::<KeyCode>(), Ok(KeyCode::Space));
        assert_eq!("Digit1".parse::<KeyCode>(), Ok(KeyCode::Digit1));
        assert_eq!("F12".parse::<KeyCode>(), Ok(KeyCode::F12));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            "Hyper".parse::<KeyCode>(),
            Err(InputError::UnknownKey("Hyper".into()))
        );
        // Codes are case-sensitive, like the DOM.
        assert!("keyw".parse::<KeyCode>().is_err());
    }

    #[test]
    fn test_every_key_round_trips_through_its_name() {
        for key in KeyCode::ALL {
            assert_eq!(key.as_str().parse::<KeyCode>(), Ok(*key));
        }
    }

    #[test]
    fn test_mouse_dom_index() {
        assert_eq!(MouseButton::from_dom_index(0), Ok(MouseButton::Left));
        assert_eq!(MouseButton::from_dom_index(2), Ok(MouseButton::Right));
        assert_eq!(
            MouseButton::from_dom_index(7),
            Err(InputError::UnknownButton(7))
        );
    }

    #[test]
    fn test_input_code_parse() {
        assert_eq!(
            "MouseRight".parse::<InputCode>(),
            Ok(InputCode::Mouse(MouseButton::Right))
        );
        assert_eq!("KeyA".parse::<InputCode>(), Ok(InputCode::Key(KeyCode::KeyA)));
        assert!("Nope".parse::<InputCode>().is_err());
        assert_eq!(InputCode::from(KeyCode::Space).to_string(), "Space");
    }
}
