//! Per-frame button state tracking.

use std::collections::HashSet;
use std::hash::Hash;

use crate::event::ButtonState;

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: went down this frame (was not held before)
/// - `just_released`: went up this frame
#[derive(Debug, Clone)]
pub struct ButtonSet<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> ButtonSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Apply a transition. Auto-repeat presses of a held input are ignored.
    pub fn apply(&mut self, input: T, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if self.pressed.insert(input) {
                    self.just_pressed.insert(input);
                }
            }
            ButtonState::Released => {
                if self.pressed.remove(&input) {
                    self.just_released.insert(input);
                }
            }
        }
    }

    /// Clear per-frame state.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Release everything without reporting releases (focus loss).
    pub fn reset(&mut self) {
        self.pressed.clear();
        self.clear_just();
    }
}

impl<T: Eq + Hash + Copy> Default for ButtonSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_edges() {
        let mut set = ButtonSet::new();
        set.apply(1u8, ButtonState::Pressed);
        assert!(set.pressed(1));
        assert!(set.just_pressed(1));

        set.clear_just();
        assert!(set.pressed(1));
        assert!(!set.just_pressed(1));

        set.apply(1, ButtonState::Released);
        assert!(!set.pressed(1));
        assert!(set.just_released(1));
    }

    #[test]
    fn test_repeat_press_is_not_an_edge() {
        let mut set = ButtonSet::new();
        set.apply(1u8, ButtonState::Pressed);
        set.clear_just();
        set.apply(1, ButtonState::Pressed);
        assert!(!set.just_pressed(1));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut set: ButtonSet<u8> = ButtonSet::new();
        set.apply(4, ButtonState::Released);
        assert!(!set.just_released(4));
    }
}
