//! Core [`Component`] trait and its type identity.
//!
//! Every piece of data stored in the ECS must implement [`Component`]. The trait
//! requires `Send + Sync + 'static` so components can live in type-erased
//! storage and be held across the await points of an asynchronous system.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is the concrete Rust type's [`TypeId`]. Two distinct
//! types always get distinct ids, even when their [`Component::type_name`]
//! strings are equal; the name is carried along for logs and `Debug` only.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Identity of one concrete component type.
///
/// Equality, hashing and ordering use the [`TypeId`] alone. The ordering is
/// stable within one build and carries no other meaning.
#[derive(Clone, Copy)]
pub struct ComponentTypeId {
    id: TypeId,
    name: &'static str,
}

impl ComponentTypeId {
    /// The id of component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::type_name(),
        }
    }

    /// The [`Component::type_name`] of the type. Not unique.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ComponentTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentTypeId {}

impl Hash for ComponentTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ComponentTypeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComponentTypeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentTypeId({})", self.name)
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// The core component trait.
///
/// Components are plain data. They carry no behaviour the engine relies on,
/// and each entity holds at most one instance of a given component type.
///
/// # Examples
///
/// ```rust
/// use engine_component::Component;
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// A human-readable name for this component type, used in logs.
    fn type_name() -> &'static str;
}

/// Object-safe view of a [`Component`].
///
/// Used wherever components of different types travel together, e.g. the
/// seed list passed when creating an entity. Implemented for every
/// [`Component`] automatically.
pub trait AnyComponent: Any + Send + Sync {
    /// The [`ComponentTypeId`] of the concrete component.
    fn dyn_type_id(&self) -> ComponentTypeId;

    /// The [`Component::type_name`] of the concrete component.
    fn dyn_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Component> AnyComponent for T {
    fn dyn_type_id(&self) -> ComponentTypeId {
        ComponentTypeId::of::<T>()
    }

    fn dyn_type_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl std::fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dyn_type_name())
    }
}
