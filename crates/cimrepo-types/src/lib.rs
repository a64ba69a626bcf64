//! Foundation types for the cimrepo object repository.
//!
//! The data model follows the CIM meta-schema: namespaces contain qualifier
//! declarations and classes; classes form single-inheritance trees of
//! features (properties, references, methods); instances are addressed by
//! normalized object paths.
//!
//! # Identity rules
//!
//! - Element names ([`CimName`]) and namespace names ([`NamespaceName`]) are
//!   case-insensitive: equality, ordering, and hashing fold to ASCII
//!   lowercase while the original spelling is preserved for display.
//! - Object paths ([`ObjectPath`]) normalize to a canonical string form
//!   (folded namespace/class/key names, lexicographically ordered key
//!   bindings) so textually different spellings of the same object resolve
//!   to the same identity. The canonical form is the repository's cache key.
//!
//! # Resolution model
//!
//! [`ClassDefinition`] holds only what a class declares itself;
//! [`ResolvedClass`] is the merged view across the ancestor chain, with each
//! [`ResolvedFeature`] annotated with `class_origin` and `propagated`.

pub mod class;
pub mod error;
pub mod instance;
pub mod name;
pub mod path;
pub mod qualifier;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use class::{
    ClassDefinition, Feature, Method, Parameter, ParameterKind, Property, Reference,
    ResolvedClass, ResolvedFeature,
};
pub use error::{TypeError, TypeResult};
pub use instance::Instance;
pub use name::{CimName, NamespaceName};
pub use path::{KeyBinding, KeyValue, ObjectPath};
pub use qualifier::{Qualifier, QualifierDeclaration, QualifierFlavor, QualifierScope};
pub use value::{CimType, Value};
