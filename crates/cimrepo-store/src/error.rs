use cimrepo_types::{CimName, NamespaceName};

/// Errors from persistent store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(NamespaceName),

    #[error("namespace already exists: {0}")]
    NamespaceExists(NamespaceName),

    /// A namespace can only be deleted once it contains no classes.
    #[error("namespace not empty: {0}")]
    NamespaceNotEmpty(NamespaceName),

    #[error("class not found: {0}")]
    ClassNotFound(CimName),

    #[error("class already exists: {0}")]
    ClassExists(CimName),

    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    #[error("instance already exists: {0}")]
    InstanceExists(String),

    #[error("qualifier not found: {0}")]
    QualifierNotFound(CimName),

    /// The backend serves compiled-in schema and rejects all mutations.
    #[error("store is read-only")]
    ReadOnly,

    /// The backend itself failed; fatal to the current operation.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
