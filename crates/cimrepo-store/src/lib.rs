//! Persistent-store abstraction for the cimrepo object repository.
//!
//! The repository core is agnostic to how objects are kept; it talks only
//! to the [`PersistentStore`] trait. Two backends live here:
//!
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//! - [`ReadOnlyStore`] -- compiled-in schema tables loaded once at process
//!   start; every mutation is rejected
//!
//! # Design Rules
//!
//! 1. Reads never create anything; absent objects report `NotFound`.
//! 2. A primary write and its association-index update are one atomic
//!    unit: a failed operation leaves no partial state visible to readers.
//! 3. Concurrent reads are always safe.
//! 4. Backend failures propagate unchanged; nothing is retried here.

pub mod assoc;
pub mod error;
pub mod memory;
pub mod readonly;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use assoc::{
    class_association_entries, instance_association_entries, ClassAssociation,
    InstanceAssociation,
};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use readonly::{ReadOnlyStore, ReadOnlyStoreBuilder};
pub use traits::PersistentStore;
