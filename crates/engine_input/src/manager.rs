//! Mapped-action input manager.
//!
//! ```text
//! platform bridge ──InputEvent──▶ EventQueue<InputEvent> ──update()──▶ InputManager
//!                                                                        │
//!                  gameplay systems ◀── is_action_active("jump") ────────┘
//! ```
//!
//! Gameplay code never asks about keys directly. It names actions, and the
//! manager resolves them through a binding table (`"jump" → [Space, MouseLeft]`)
//! that can be rebound at runtime or loaded from configuration.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use engine_event::{EventQueue, ListenerId};
use glam::Vec2;
use tracing::{debug, trace};

use crate::error::InputError;
use crate::event::{InputEvent, InputEventType};
use crate::keys::InputCode;
use crate::state::ButtonSet;

/// One active touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub id: u32,
    pub position: Vec2,
}

#[derive(Debug, Default)]
struct FrameState {
    buttons: ButtonSet<InputCode>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    wheel_delta: f32,
    touches: BTreeMap<u32, Vec2>,
}

impl FrameState {
    fn handle(&mut self, event: &InputEvent) {
        if let Some((code, state)) = event.button() {
            self.buttons.apply(code, state);
            return;
        }
        match *event {
            InputEvent::MouseMove { x, y } => {
                let next = Vec2::new(x, y);
                if let Some(prev) = self.mouse_position {
                    self.mouse_delta += next - prev;
                }
                self.mouse_position = Some(next);
            }
            InputEvent::Wheel { delta } => self.wheel_delta += delta,
            InputEvent::TouchStart { id, x, y } | InputEvent::TouchMove { id, x, y } => {
                self.touches.insert(id, Vec2::new(x, y));
            }
            InputEvent::TouchEnd { id } => {
                self.touches.remove(&id);
            }
            _ => {}
        }
    }
}

/// Cheaply cloneable handle to shared input state and action bindings.
///
/// Clones observe the same state, so one clone can be moved into event
/// listeners while another lives in the world context.
#[derive(Debug, Clone, Default)]
pub struct InputManager {
    state: Arc<Mutex<FrameState>>,
    bindings: Arc<DashMap<String, Vec<InputCode>>>,
}

impl InputManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FrameState> {
        // State stays consistent even if a listener panicked mid-update.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to every input event type on `queue`.
    ///
    /// Returns the listener ids so the caller can detach later.
    pub fn attach(&self, queue: &mut EventQueue<InputEvent>) -> Vec<ListenerId> {
        InputEventType::ALL
            .iter()
            .map(|&event_type| {
                let handle = self.clone();
                queue.add_listener(event_type, None, move |event: &InputEvent| {
                    handle.handle(event);
                })
            })
            .collect()
    }

    /// Apply a single event directly, bypassing any queue.
    pub fn handle(&self, event: &InputEvent) {
        trace!(?event, "input event");
        self.state().handle(event);
    }

    // ── Bindings ─────────────────────────────────────────────────────

    /// Bind `code` to `action`. An action may have several codes; binding the
    /// same code twice has no effect.
    pub fn map_input(&self, action: impl Into<String>, code: impl Into<InputCode>) {
        let action = action.into();
        let code = code.into();
        let mut codes = self.bindings.entry(action.clone()).or_default();
        if !codes.contains(&code) {
            codes.push(code);
            debug!(action = %action, %code, "input mapped");
        }
    }

    /// Bind every `(action, [code names])` pair, validating all names first.
    ///
    /// # Errors
    ///
    /// Returns the first unknown code or empty action name; nothing is bound
    /// in that case.
    pub fn load_bindings<'a, I, S>(&self, table: I) -> Result<(), InputError>
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<S>)>,
        S: AsRef<str> + 'a,
    {
        let mut parsed = Vec::new();
        for (action, names) in table {
            if action.is_empty() {
                return Err(InputError::EmptyAction);
            }
            for name in names {
                let name: &str = name.as_ref();
                parsed.push((action.clone(), name.parse::<InputCode>()?));
            }
        }
        for (action, code) in parsed {
            self.map_input(action, code);
        }
        Ok(())
    }

    /// Remove every binding of `action`. Returns `false` if it had none.
    pub fn unmap_action(&self, action: &str) -> bool {
        self.bindings.remove(action).is_some()
    }

    /// Codes currently bound to `action`.
    #[must_use]
    pub fn bindings(&self, action: &str) -> Vec<InputCode> {
        self.bindings
            .get(action)
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }

    fn any_bound(&self, action: &str, test: impl Fn(&ButtonSet<InputCode>, InputCode) -> bool) -> bool {
        let Some(codes) = self.bindings.get(action) else {
            return false;
        };
        let state = self.state();
        codes.iter().any(|&code| test(&state.buttons, code))
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// `true` while any code bound to `action` is held. Unknown actions are
    /// never active.
    #[must_use]
    pub fn is_action_active(&self, action: &str) -> bool {
        self.any_bound(action, |b, c| b.pressed(c))
    }

    /// `true` on the frame the action became active: a bound code went down
    /// and no other bound code was already held from an earlier frame.
    #[must_use]
    pub fn was_action_just_pressed(&self, action: &str) -> bool {
        self.any_bound(action, |b, c| b.just_pressed(c))
            && !self.any_bound(action, |b, c| b.pressed(c) && !b.just_pressed(c))
    }

    /// `true` on the frame the action stopped being active: a bound code went
    /// up and no other bound code is still held.
    #[must_use]
    pub fn was_action_just_released(&self, action: &str) -> bool {
        self.any_bound(action, |b, c| b.just_released(c)) && !self.is_action_active(action)
    }

    /// `-1.0`, `0.0` or `1.0` from a pair of opposing actions.
    #[must_use]
    pub fn axis(&self, negative: &str, positive: &str) -> f32 {
        let value = |action: &str| if self.is_action_active(action) { 1.0 } else { 0.0 };
        value(positive) - value(negative)
    }

    /// Last known cursor position, if the cursor has moved at all.
    #[must_use]
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.state().mouse_position
    }

    /// Cursor movement accumulated since the last [`end_frame`](Self::end_frame).
    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.state().mouse_delta
    }

    /// Wheel movement accumulated since the last [`end_frame`](Self::end_frame).
    #[must_use]
    pub fn wheel_delta(&self) -> f32 {
        self.state().wheel_delta
    }

    /// Active touches ordered by id.
    #[must_use]
    pub fn active_touches(&self) -> Vec<Touch> {
        self.state()
            .touches
            .iter()
            .map(|(&id, &position)| Touch { id, position })
            .collect()
    }

    /// Clear per-frame edges and accumulated deltas. Held buttons, the cursor
    /// position and active touches persist.
    pub fn end_frame(&self) {
        let mut state = self.state();
        state.buttons.clear_just();
        state.mouse_delta = Vec2::ZERO;
        state.wheel_delta = 0.0;
    }

    /// Release all buttons and touches without reporting edges, as after a
    /// focus loss.
    pub fn reset(&self) {
        let mut state = self.state();
        state.buttons.reset();
        state.touches.clear();
        state.mouse_delta = Vec2::ZERO;
        state.wheel_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::keys::{KeyCode, MouseButton};

    fn attached() -> (InputManager, EventQueue<InputEvent>) {
        let mut queue = EventQueue::new();
        let input = InputManager::new();
        input.attach(&mut queue);
        (input, queue)
    }

    #[test]
    fn test_action_follows_bound_key() {
        let (input, mut queue) = attached();
        input.map_input("jump", KeyCode::Space);

        queue.broadcast(InputEvent::KeyDown(KeyCode::Space));
        assert!(!input.is_action_active("jump"));
        queue.update();
        assert!(input.is_action_active("jump"));
        assert!(input.was_action_just_pressed("jump"));

        input.end_frame();
        assert!(input.is_action_active("jump"));
        assert!(!input.was_action_just_pressed("jump"));

        queue.broadcast(InputEvent::KeyUp(KeyCode::Space));
        queue.update();
        assert!(!input.is_action_active("jump"));
        assert!(input.was_action_just_released("jump"));
    }

    #[test]
    fn test_unknown_action_is_inactive() {
        let (input, mut queue) = attached();
        queue.broadcast(InputEvent::KeyDown(KeyCode::KeyW));
        queue.update();
        assert!(!input.is_action_active("forward"));
        assert!(!input.was_action_just_pressed("forward"));
    }

    #[test]
    fn test_multiple_bindings_release_requires_all_up() {
        let (input, mut queue) = attached();
        input.map_input("fire", KeyCode::KeyF);
        input.map_input("fire", MouseButton::Left);

        queue.broadcast(InputEvent::KeyDown(KeyCode::KeyF));
        queue.broadcast(InputEvent::MouseDown(MouseButton::Left));
        queue.update();
        input.end_frame();

        queue.broadcast(InputEvent::KeyUp(KeyCode::KeyF));
        queue.update();
        assert!(input.is_action_active("fire"));
        assert!(!input.was_action_just_released("fire"));
    }

    #[test]
    fn test_multiple_bindings_press_requires_none_held() {
        let (input, mut queue) = attached();
        input.map_input("fire", KeyCode::KeyF);
        input.map_input("fire", MouseButton::Left);

        queue.broadcast(InputEvent::KeyDown(KeyCode::KeyF));
        queue.update();
        assert!(input.was_action_just_pressed("fire"));
        input.end_frame();

        queue.broadcast(InputEvent::MouseDown(MouseButton::Left));
        queue.update();
        assert!(input.is_action_active("fire"));
        assert!(!input.was_action_just_pressed("fire"));
        input.end_frame();

        queue.broadcast(InputEvent::KeyUp(KeyCode::KeyF));
        queue.broadcast(InputEvent::MouseUp(MouseButton::Left));
        queue.update();
        input.end_frame();

        // Both codes going down in the same frame is one press.
        queue.broadcast(InputEvent::KeyDown(KeyCode::KeyF));
        queue.broadcast(InputEvent::MouseDown(MouseButton::Left));
        queue.update();
        assert!(input.was_action_just_pressed("fire"));
    }

    #[test]
    fn test_axis() {
        let (input, mut queue) = attached();
        input.map_input("left", KeyCode::KeyA);
        input.map_input("right", KeyCode::KeyD);
        assert_eq!(input.axis("left", "right"), 0.0);

        queue.broadcast(InputEvent::KeyDown(KeyCode::KeyD));
        queue.update();
        assert_eq!(input.axis("left", "right"), 1.0);

        queue.broadcast(InputEvent::KeyDown(KeyCode::KeyA));
        queue.update();
        assert_eq!(input.axis("left", "right"), 0.0);

        queue.broadcast(InputEvent::KeyUp(KeyCode::KeyD));
        queue.update();
        assert_eq!(input.axis("left", "right"), -1.0);
    }

    #[test]
    fn test_mouse_motion_and_wheel_accumulate_per_frame() {
        let (input, mut queue) = attached();
        assert_eq!(input.mouse_position(), None);

        queue.broadcast(InputEvent::MouseMove { x: 10.0, y: 10.0 });
        queue.broadcast(InputEvent::MouseMove { x: 13.0, y: 6.0 });
        queue.broadcast(InputEvent::Wheel { delta: 1.0 });
        queue.broadcast(InputEvent::Wheel { delta: 0.5 });
        queue.update();

        assert_eq!(input.mouse_position(), Some(Vec2::new(13.0, 6.0)));
        assert_eq!(input.mouse_delta(), Vec2::new(3.0, -4.0));
        assert_eq!(input.wheel_delta(), 1.5);

        input.end_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.wheel_delta(), 0.0);
        assert_eq!(input.mouse_position(), Some(Vec2::new(13.0, 6.0)));
    }

    #[test]
    fn test_touches() {
        let (input, mut queue) = attached();
        queue.broadcast(InputEvent::TouchStart { id: 2, x: 5.0, y: 5.0 });
        queue.broadcast(InputEvent::TouchStart { id: 1, x: 1.0, y: 1.0 });
        queue.broadcast(InputEvent::TouchMove { id: 2, x: 6.0, y: 7.0 });
        queue.update();

        let touches = input.active_touches();
        assert_eq!(touches.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(touches[1].position, Vec2::new(6.0, 7.0));

        queue.broadcast(InputEvent::TouchEnd { id: 1 });
        queue.update();
        assert_eq!(input.active_touches().len(), 1);
    }

    #[test]
    fn test_unmap_and_duplicate_bindings() {
        let input = InputManager::new();
        input.map_input("jump", KeyCode::Space);
        input.map_input("jump", KeyCode::Space);
        assert_eq!(input.bindings("jump"), vec![InputCode::Key(KeyCode::Space)]);

        assert!(input.unmap_action("jump"));
        assert!(!input.unmap_action("jump"));
        assert!(input.bindings("jump").is_empty());
    }

    #[test]
    fn test_load_bindings_is_all_or_nothing() {
        let input = InputManager::new();
        let mut table: HashMap<String, Vec<String>> = HashMap::new();
        table.insert("jump".into(), vec!["Space".into(), "MouseLeft".into()]);
        input.load_bindings(&table).unwrap();
        assert_eq!(input.bindings("jump").len(), 2);

        table.insert("dash".into(), vec!["NotAKey".into()]);
        let err = input.load_bindings(&table).unwrap_err();
        assert_eq!(err, InputError::UnknownKey("NotAKey".into()));
        assert!(input.bindings("dash").is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let input = InputManager::new();
        let other = input.clone();
        input.map_input("jump", KeyCode::Space);
        other.handle(&InputEvent::KeyDown(KeyCode::Space));
        assert!(input.is_action_active("jump"));

        input.reset();
        assert!(!other.is_action_active("jump"));
        assert!(!other.was_action_just_released("jump"));
    }
}
