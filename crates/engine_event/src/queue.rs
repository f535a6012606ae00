//! Two-phase event queue.
//!
//! ```text
//!  producer ──broadcast──▶ [ pending ] ──update()──▶ listeners (registration order)
//!                                         └─ pending cleared
//! ```
//!
//! Only the events pending when [`EventQueue::update`] starts are delivered by
//! that call. Anything broadcast while listeners run (through a captured
//! [`EventSender`]) waits for the next `update`.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::trace;

use crate::event::Event;

/// Handle returned by [`EventQueue::add_listener`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Listener<E: Event> {
    id: ListenerId,
    event_type: E::Type,
    sub_type: Option<E::SubType>,
    callback: Box<dyn FnMut(&E) + Send>,
}

impl<E: Event> Listener<E> {
    fn accepts(&self, event: &E) -> bool {
        if self.event_type != event.event_type() {
            return false;
        }
        match self.sub_type {
            None => true,
            Some(wanted) => event.sub_type() == Some(wanted),
        }
    }
}

/// Cloneable producer side of an [`EventQueue`].
///
/// Lets systems and backends broadcast without holding a reference to the
/// queue itself.
pub struct EventSender<E: Event> {
    tx: UnboundedSender<E>,
}

impl<E: Event> std::fmt::Debug for EventSender<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<E: Event> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Event> EventSender<E> {
    /// Queue an event for delivery on the owning queue's next `update`.
    ///
    /// Broadcasting after the queue has been dropped is a silent no-op.
    pub fn broadcast(&self, event: E) {
        if self.tx.send(event).is_err() {
            trace!("event dropped: queue no longer exists");
        }
    }
}

/// A publish/subscribe channel with deferred delivery.
pub struct EventQueue<E: Event> {
    listeners: Vec<Listener<E>>,
    tx: UnboundedSender<E>,
    rx: UnboundedReceiver<E>,
    next_listener: u64,
}

impl<E: Event> EventQueue<E> {
    /// Create an empty queue with no listeners.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            listeners: Vec::new(),
            tx,
            rx,
            next_listener: 0,
        }
    }

    /// Register a callback for events of `event_type`.
    ///
    /// With `sub_type = None` the listener receives every sub-type of that
    /// type; with `Some(s)` only events whose sub-type equals `s`.
    pub fn add_listener<F>(
        &mut self,
        event_type: E::Type,
        sub_type: Option<E::SubType>,
        callback: F,
    ) -> ListenerId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            event_type,
            sub_type,
            callback: Box::new(callback),
        });
        trace!(listener = id.0, ?event_type, ?sub_type, "listener added");
        id
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Queue an event for delivery on the next [`update`](Self::update).
    pub fn broadcast(&self, event: E) {
        // The receiver lives in `self`, so the send cannot fail.
        let _ = self.tx.send(event);
    }

    /// A producer handle feeding this queue.
    #[must_use]
    pub fn sender(&self) -> EventSender<E> {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Deliver every event pending at the time of the call to its matching
    /// listeners, in broadcast order, then clear them.
    ///
    /// Returns the number of listener invocations.
    pub fn update(&mut self) -> usize {
        let batch_len = self.rx.len();
        if batch_len == 0 {
            return 0;
        }

        let mut batch = Vec::with_capacity(batch_len);
        for _ in 0..batch_len {
            match self.rx.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }

        let mut delivered = 0;
        for event in &batch {
            for listener in self.listeners.iter_mut().filter(|l| l.accepts(event)) {
                (listener.callback)(event);
                delivered += 1;
            }
        }

        trace!(events = batch.len(), delivered, "event queue flushed");
        delivered
    }

    /// Number of events waiting for the next [`update`](Self::update).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Discard all pending events without delivering them.
    pub fn clear(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: Event> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> std::fmt::Debug for EventQueue<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.rx.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Key,
        Mouse,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct TestEvent {
        kind: Kind,
        code: Option<u32>,
    }

    impl Event for TestEvent {
        type Type = Kind;
        type SubType = u32;

        fn event_type(&self) -> Kind {
            self.kind
        }

        fn sub_type(&self) -> Option<u32> {
            self.code
        }
    }

    fn key(code: u32) -> TestEvent {
        TestEvent {
            kind: Kind::Key,
            code: Some(code),
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<TestEvent>>>, impl FnMut(&TestEvent) + Send + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |e: &TestEvent| sink.lock().unwrap().push(e.clone()))
    }

    #[test]
    fn test_delivery_waits_for_update() {
        let mut queue = EventQueue::new();
        let (log, cb) = recorder();
        queue.add_listener(Kind::Key, None, cb);

        queue.broadcast(key(1));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.update(), 1);
        assert_eq!(*log.lock().unwrap(), vec![key(1)]);

        // Second update without a new broadcast delivers nothing.
        assert_eq!(queue.update(), 0);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sub_type_filter() {
        let mut queue = EventQueue::new();
        let (only_7, cb7) = recorder();
        let (any_key, cb_any) = recorder();
        queue.add_listener(Kind::Key, Some(7), cb7);
        queue.add_listener(Kind::Key, None, cb_any);

        queue.broadcast(key(7));
        queue.broadcast(key(8));
        queue.broadcast(TestEvent {
            kind: Kind::Key,
            code: None,
        });
        queue.update();

        assert_eq!(*only_7.lock().unwrap(), vec![key(7)]);
        assert_eq!(any_key.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_type_filter() {
        let mut queue = EventQueue::new();
        let (log, cb) = recorder();
        queue.add_listener(Kind::Mouse, None, cb);

        queue.broadcast(key(1));
        assert_eq!(queue.update(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_registration_order() {
        let mut queue = EventQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = Arc::clone(&order);
            queue.add_listener(Kind::Key, None, move |_| order.lock().unwrap().push(n));
        }
        queue.broadcast(key(0));
        queue.update();
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_broadcast_without_listeners_is_noop() {
        let mut queue: EventQueue<TestEvent> = EventQueue::new();
        queue.broadcast(key(1));
        assert_eq!(queue.update(), 0);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_remove_listener() {
        let mut queue = EventQueue::new();
        let (log, cb) = recorder();
        let id = queue.add_listener(Kind::Key, None, cb);
        assert!(queue.remove_listener(id));
        assert!(!queue.remove_listener(id));

        queue.broadcast(key(1));
        queue.update();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_broadcast_during_delivery_waits_for_next_update() {
        let mut queue = EventQueue::new();
        let sender = queue.sender();
        let (log, mut cb) = recorder();
        queue.add_listener(Kind::Key, None, move |e: &TestEvent| {
            cb(e);
            if e.code == Some(1) {
                sender.broadcast(key(2));
            }
        });

        queue.broadcast(key(1));
        assert_eq!(queue.update(), 1);
        assert_eq!(*log.lock().unwrap(), vec![key(1)]);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.update(), 1);
        assert_eq!(*log.lock().unwrap(), vec![key(1), key(2)]);
    }

    #[test]
    fn test_sender_feeds_queue() {
        let mut queue = EventQueue::new();
        let (log, cb) = recorder();
        queue.add_listener(Kind::Key, None, cb);

        let sender = queue.sender();
        let cloned = sender.clone();
        sender.broadcast(key(3));
        cloned.broadcast(key(4));
        queue.update();
        assert_eq!(*log.lock().unwrap(), vec![key(3), key(4)]);
    }

    #[test]
    fn test_sender_outliving_queue() {
        let queue: EventQueue<TestEvent> = EventQueue::new();
        let sender = queue.sender();
        drop(queue);
        sender.broadcast(key(1));
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut queue = EventQueue::new();
        let (log, cb) = recorder();
        queue.add_listener(Kind::Key, None, cb);
        queue.broadcast(key(1));
        queue.clear();
        assert_eq!(queue.update(), 0);
        assert!(log.lock().unwrap().is_empty());
    }
}
