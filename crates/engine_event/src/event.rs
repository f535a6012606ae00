//! The [`Event`] contract.

use std::fmt::Debug;
use std::hash::Hash;

/// A record that can travel through an [`EventQueue`](crate::EventQueue).
///
/// Events are tagged unions: [`event_type`](Event::event_type) is the primary
/// discriminator listeners subscribe to, and [`sub_type`](Event::sub_type)
/// optionally narrows it further (a key code for `KeyDown`, say).
///
/// # Examples
///
/// ```rust
/// use engine_event::Event;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum DoorEventType { Opened, Closed }
///
/// struct DoorEvent { kind: DoorEventType, door: u32 }
///
/// impl Event for DoorEvent {
///     type Type = DoorEventType;
///     type SubType = u32;
///
///     fn event_type(&self) -> DoorEventType { self.kind }
///     fn sub_type(&self) -> Option<u32> { Some(self.door) }
/// }
/// ```
pub trait Event: Send + 'static {
    /// Primary discriminator.
    type Type: Copy + Eq + Hash + Debug + Send + 'static;
    /// Secondary discriminator.
    type SubType: Copy + Eq + Hash + Debug + Send + 'static;

    fn event_type(&self) -> Self::Type;

    fn sub_type(&self) -> Option<Self::SubType> {
        None
    }
}
