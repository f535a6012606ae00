//! Collision events broadcast by the physics system.

use engine_ecs::Entity;
use engine_event::Event;
use serde::{Deserialize, Serialize};

/// Event type of a [`CollisionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionEventType {
    CollisionStart,
    CollisionEnd,
}

/// Two entities began or stopped touching.
///
/// `a` is always the lower entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub kind: CollisionEventType,
    pub a: Entity,
    pub b: Entity,
}

impl CollisionEvent {
    #[must_use]
    pub fn start(a: Entity, b: Entity) -> Self {
        Self::new(CollisionEventType::CollisionStart, a, b)
    }

    #[must_use]
    pub fn end(a: Entity, b: Entity) -> Self {
        Self::new(CollisionEventType::CollisionEnd, a, b)
    }

    fn new(kind: CollisionEventType, a: Entity, b: Entity) -> Self {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        Self { kind, a, b }
    }

    /// Returns `true` if `entity` is one of the pair.
    #[must_use]
    pub fn involves(&self, entity: Entity) -> bool {
        self.a == entity || self.b == entity
    }

    /// The other member of the pair, if `entity` is one of them.
    #[must_use]
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }
}

impl Event for CollisionEvent {
    type Type = CollisionEventType;
    type SubType = ();

    fn event_type(&self) -> CollisionEventType {
        self.kind
    }
}
