//! Registry error types.
//!
//! Most registry operations treat absence as a normal outcome and return
//! `Option`/`bool`. [`EcsError`] exists for the `try_*` variants, for callers
//! that want a missing entity reported rather than ignored.

use engine_component::Entity;

/// Errors reported by the checked registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EcsError {
    /// The entity was never created or has already been removed.
    #[error("{0} does not exist")]
    EntityNotFound(Entity),

    /// The entity exists but lacks the requested component.
    #[error("{entity} has no `{component}` component")]
    ComponentNotFound {
        entity: Entity,
        component: &'static str,
    },
}
