//! The repository core: schema and instance operations over a pluggable
//! persistent store, with inheritance resolution and object caching.
//!
//! [`Repository`] is the single entry point. It owns one reader/writer
//! lock; read operations share it, mutations take it exclusively for the
//! store write plus the cache invalidation that write requires. Resolved
//! classes are cached in one canonical shape and narrowed per request
//! through [`ClassView`].

pub mod error;
pub mod hierarchy;
pub mod repository;
pub mod view;

pub use error::{RepositoryError, RepositoryResult};
pub use repository::{AssociationFilter, Repository, RepositoryConfig};
pub use view::ClassView;
