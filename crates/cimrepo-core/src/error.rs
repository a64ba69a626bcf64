use cimrepo_resolver::ResolveError;
use cimrepo_store::StoreError;
use cimrepo_types::{CimName, NamespaceName};

/// Errors surfaced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("namespace not found: {0}")]
    NamespaceNotFound(NamespaceName),

    #[error("class not found: {0}")]
    ClassNotFound(CimName),

    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    #[error("qualifier not found: {0}")]
    QualifierNotFound(CimName),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A dangling or cyclic superclass reference, or an operation that
    /// would create one.
    #[error("invalid class hierarchy: {0}")]
    InvalidClassHierarchy(String),

    /// The configured feature or qualifier capacity was exceeded during
    /// resolution.
    #[error("resolution overflow: {0}")]
    ResolutionOverflow(#[from] ResolveError),

    /// Malformed key bindings, property list, or qualifier scope/flavor.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The persistent-store backend failed; fatal to the current
    /// operation, never retried here.
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NamespaceNotFound(ns) => RepositoryError::NamespaceNotFound(ns),
            StoreError::ClassNotFound(name) => RepositoryError::ClassNotFound(name),
            StoreError::InstanceNotFound(path) => RepositoryError::InstanceNotFound(path),
            StoreError::QualifierNotFound(name) => RepositoryError::QualifierNotFound(name),
            StoreError::NamespaceExists(ns) => RepositoryError::AlreadyExists(ns.to_string()),
            StoreError::ClassExists(name) => RepositoryError::AlreadyExists(name.to_string()),
            StoreError::InstanceExists(path) => RepositoryError::AlreadyExists(path),
            StoreError::NamespaceNotEmpty(ns) => {
                RepositoryError::InvalidParameter(format!("namespace {ns} is not empty"))
            }
            other @ (StoreError::ReadOnly | StoreError::Backend(_)) => {
                RepositoryError::Store(other)
            }
        }
    }
}

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
