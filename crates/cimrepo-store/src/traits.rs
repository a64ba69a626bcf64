use cimrepo_types::{
    CimName, ClassDefinition, Instance, NamespaceName, ObjectPath, QualifierDeclaration,
};

use crate::assoc::{ClassAssociation, InstanceAssociation};
use crate::error::StoreResult;

/// Abstract durable storage of namespaces, qualifier declarations, classes,
/// instances, and association indices.
///
/// All implementations must satisfy these invariants:
/// - Every read that names an absent object returns the matching `NotFound`
///   error; no read implicitly creates anything.
/// - Class and instance writes maintain the association index atomically
///   with the primary object: if either sub-write would fail, the operation
///   fails as a whole and no partial state is observable by later reads.
/// - Concurrent reads are safe with each other and with other readers.
/// - Backend failures are propagated, never silently swallowed.
pub trait PersistentStore: Send + Sync {
    // -- Namespaces ---------------------------------------------------------

    /// Create an empty namespace. Fails if it already exists.
    fn create_namespace(&self, namespace: &NamespaceName) -> StoreResult<()>;

    /// Update namespace attributes (currently the read-only flag).
    fn modify_namespace(&self, namespace: &NamespaceName, read_only: bool) -> StoreResult<()>;

    /// Delete a namespace. Fails while the namespace contains classes.
    fn delete_namespace(&self, namespace: &NamespaceName) -> StoreResult<()>;

    /// All namespace names, sorted.
    fn list_namespaces(&self) -> StoreResult<Vec<NamespaceName>>;

    fn namespace_exists(&self, namespace: &NamespaceName) -> StoreResult<bool>;

    // -- Qualifier declarations --------------------------------------------

    fn read_qualifier(
        &self,
        namespace: &NamespaceName,
        name: &CimName,
    ) -> StoreResult<QualifierDeclaration>;

    /// Create or replace a qualifier declaration.
    fn write_qualifier(
        &self,
        namespace: &NamespaceName,
        declaration: &QualifierDeclaration,
    ) -> StoreResult<()>;

    fn delete_qualifier(&self, namespace: &NamespaceName, name: &CimName) -> StoreResult<()>;

    /// All declarations in the namespace, sorted by name.
    fn list_qualifiers(&self, namespace: &NamespaceName) -> StoreResult<Vec<QualifierDeclaration>>;

    // -- Classes ------------------------------------------------------------

    fn read_class(
        &self,
        namespace: &NamespaceName,
        name: &CimName,
    ) -> StoreResult<ClassDefinition>;

    /// Store a new class and its association index entries as one unit.
    fn create_class(&self, namespace: &NamespaceName, class: &ClassDefinition) -> StoreResult<()>;

    /// Replace an existing class definition, rebuilding its class-level
    /// association index entries. The caller must not change
    /// `is_association`: instance index entries are built at instance
    /// creation and are not rebuilt here.
    fn modify_class(&self, namespace: &NamespaceName, class: &ClassDefinition) -> StoreResult<()>;

    /// Delete a class together with its instances and every association
    /// index entry they carried.
    fn delete_class(&self, namespace: &NamespaceName, name: &CimName) -> StoreResult<()>;

    /// All class names in the namespace, sorted.
    fn list_class_names(&self, namespace: &NamespaceName) -> StoreResult<Vec<CimName>>;

    // -- Instances ----------------------------------------------------------

    fn read_instance(&self, namespace: &NamespaceName, path: &ObjectPath)
        -> StoreResult<Instance>;

    /// Store a new instance and its association index entries as one unit.
    /// The path must already be normalized by the caller.
    fn create_instance(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        instance: &Instance,
    ) -> StoreResult<()>;

    /// Replace an existing instance, rebuilding its association index
    /// entries.
    fn modify_instance(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        instance: &Instance,
    ) -> StoreResult<()>;

    fn delete_instance(&self, namespace: &NamespaceName, path: &ObjectPath) -> StoreResult<()>;

    /// Paths of all instances of exactly `class` (no subclass expansion),
    /// sorted by canonical form.
    fn list_instance_paths(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> StoreResult<Vec<ObjectPath>>;

    // -- Association index --------------------------------------------------

    /// Index entries whose "from" side is the given instance path. This is
    /// the only lookup associator/reference queries need; it must not scan
    /// unrelated instances.
    fn reference_entries(
        &self,
        namespace: &NamespaceName,
        from_path: &ObjectPath,
    ) -> StoreResult<Vec<InstanceAssociation>>;

    /// Class-level index entries whose "from" side names the given class.
    fn class_reference_entries(
        &self,
        namespace: &NamespaceName,
        from_class: &CimName,
    ) -> StoreResult<Vec<ClassAssociation>>;
}
