//! System ordering.
//!
//! The registry keeps its systems in a [`SystemList`] that is always sorted
//! ascending by [`Priority`]. The sort is stable, so systems sharing a
//! priority run in the order they were added:
//!
//! ```text
//! add S1 (Update)      → [S1]
//! add S3 (Update)      → [S1, S3]
//! add S2 (PreUpdate)   → [S2, S1, S3]
//! ```

use serde::{Deserialize, Serialize};

use crate::system::{Priority, System};

/// Identity of a registered system, returned by
/// [`Registry::add_system`](crate::Registry::add_system).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SystemId(pub u64);

/// A registered system together with its cached ordering key.
pub(crate) struct SystemEntry<W> {
    pub id: SystemId,
    pub priority: Priority,
    pub system: Box<dyn System<W>>,
}

/// An ordered list of systems.
pub(crate) struct SystemList<W> {
    entries: Vec<SystemEntry<W>>,
}

impl<W> SystemList<W> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append and restore ordering. `sort_by_key` is stable, which keeps ties
    /// in insertion order.
    pub fn push(&mut self, entry: SystemEntry<W>) {
        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.priority);
    }

    /// Move every entry of `other` in, preserving `other`'s relative order.
    pub fn append(&mut self, other: SystemList<W>) {
        self.entries.extend(other.entries);
        self.entries.sort_by_key(|e| e.priority);
    }

    pub fn remove(&mut self, id: SystemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemEntry<W>> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SystemEntry<W>> {
        self.entries.iter_mut()
    }
}

impl<W> Default for SystemList<W> {
    fn default() -> Self {
        Self::new()
    }
}
