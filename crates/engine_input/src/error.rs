use thiserror::Error;

/// Errors raised while translating platform input identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key code `{0}`")]
    UnknownKey(String),

    #[error("unknown mouse button index {0}")]
    UnknownButton(i16),

    #[error("action name must not be empty")]
    EmptyAction,
}
