//! # engine_event
//!
//! Decoupled signalling between producers (input bridge, physics, game logic)
//! and consumers (systems, controllers).
//!
//! This crate provides:
//!
//! - [`Event`] — the tagged-union contract: a `type` discriminator plus an
//!   optional `sub_type` discriminator.
//! - [`EventQueue`] — two-phase queue: [`broadcast`](EventQueue::broadcast)
//!   buffers, [`update`](EventQueue::update) delivers and clears.
//! - [`EventSender`] — a cloneable producer handle that broadcasts into a
//!   queue without borrowing it.

pub mod event;
pub mod queue;

pub use event::Event;
pub use queue::{EventQueue, EventSender, ListenerId};
