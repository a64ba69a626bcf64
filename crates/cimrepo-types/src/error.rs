/// Errors from constructing or parsing data model types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A class, property, or qualifier name is not a valid identifier.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// A namespace name is empty or contains an invalid segment.
    #[error("invalid namespace name: {0:?}")]
    InvalidNamespace(String),

    /// An object path string could not be parsed.
    #[error("invalid object path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A value does not fit where it was used (e.g. a non-key-typed value
    /// in a key binding).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A qualifier flavor combination is contradictory.
    #[error("invalid qualifier flavor: {0}")]
    InvalidFlavor(String),
}

/// Result alias for type construction and parsing.
pub type TypeResult<T> = Result<T, TypeError>;
