use std::collections::HashMap;

use cimrepo_types::{
    CimName, ClassDefinition, Instance, NamespaceName, ObjectPath, QualifierDeclaration,
};

use crate::assoc::{class_association_entries, ClassAssociation, InstanceAssociation};
use crate::error::{StoreError, StoreResult};
use crate::traits::PersistentStore;

struct ReadOnlyNamespace {
    qualifiers: HashMap<CimName, QualifierDeclaration>,
    classes: HashMap<CimName, ClassDefinition>,
    class_assocs: Vec<ClassAssociation>,
}

/// Compiled-in, immutable schema store.
///
/// A schema compiler (or embedding application) loads qualifier and class
/// tables once at process start; the repository then reads them exactly as
/// it would any other backend. Every mutation fails with
/// [`StoreError::ReadOnly`]. The backend holds no instances: instance reads
/// report not-found and instance listings are empty.
pub struct ReadOnlyStore {
    namespaces: HashMap<NamespaceName, ReadOnlyNamespace>,
}

impl ReadOnlyStore {
    pub fn builder() -> ReadOnlyStoreBuilder {
        ReadOnlyStoreBuilder {
            namespaces: HashMap::new(),
        }
    }
}

/// Builder assembling the immutable namespace tables.
pub struct ReadOnlyStoreBuilder {
    namespaces: HashMap<NamespaceName, ReadOnlyNamespace>,
}

impl ReadOnlyStoreBuilder {
    /// Add a namespace with its qualifier declarations and classes. The
    /// class association index is derived here, once.
    pub fn namespace(
        mut self,
        name: NamespaceName,
        qualifiers: Vec<QualifierDeclaration>,
        classes: Vec<ClassDefinition>,
    ) -> Self {
        let class_assocs = classes.iter().flat_map(class_association_entries).collect();
        self.namespaces.insert(
            name,
            ReadOnlyNamespace {
                qualifiers: qualifiers.into_iter().map(|q| (q.name.clone(), q)).collect(),
                classes: classes.into_iter().map(|c| (c.name.clone(), c)).collect(),
                class_assocs,
            },
        );
        self
    }

    pub fn build(self) -> ReadOnlyStore {
        ReadOnlyStore {
            namespaces: self.namespaces,
        }
    }
}

impl ReadOnlyStore {
    fn namespace(&self, name: &NamespaceName) -> StoreResult<&ReadOnlyNamespace> {
        self.namespaces
            .get(name)
            .ok_or_else(|| StoreError::NamespaceNotFound(name.clone()))
    }
}

impl PersistentStore for ReadOnlyStore {
    fn create_namespace(&self, _namespace: &NamespaceName) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn modify_namespace(&self, _namespace: &NamespaceName, _read_only: bool) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn delete_namespace(&self, _namespace: &NamespaceName) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn list_namespaces(&self) -> StoreResult<Vec<NamespaceName>> {
        let mut names: Vec<NamespaceName> = self.namespaces.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn namespace_exists(&self, namespace: &NamespaceName) -> StoreResult<bool> {
        Ok(self.namespaces.contains_key(namespace))
    }

    fn read_qualifier(
        &self,
        namespace: &NamespaceName,
        name: &CimName,
    ) -> StoreResult<QualifierDeclaration> {
        self.namespace(namespace)?
            .qualifiers
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::QualifierNotFound(name.clone()))
    }

    fn write_qualifier(
        &self,
        _namespace: &NamespaceName,
        _declaration: &QualifierDeclaration,
    ) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn delete_qualifier(&self, _namespace: &NamespaceName, _name: &CimName) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn list_qualifiers(&self, namespace: &NamespaceName) -> StoreResult<Vec<QualifierDeclaration>> {
        let mut decls: Vec<QualifierDeclaration> =
            self.namespace(namespace)?.qualifiers.values().cloned().collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(decls)
    }

    fn read_class(
        &self,
        namespace: &NamespaceName,
        name: &CimName,
    ) -> StoreResult<ClassDefinition> {
        self.namespace(namespace)?
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ClassNotFound(name.clone()))
    }

    fn create_class(&self, _namespace: &NamespaceName, _class: &ClassDefinition) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn modify_class(&self, _namespace: &NamespaceName, _class: &ClassDefinition) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn delete_class(&self, _namespace: &NamespaceName, _name: &CimName) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn list_class_names(&self, namespace: &NamespaceName) -> StoreResult<Vec<CimName>> {
        let mut names: Vec<CimName> = self.namespace(namespace)?.classes.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read_instance(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
    ) -> StoreResult<Instance> {
        self.namespace(namespace)?;
        Err(StoreError::InstanceNotFound(path.to_string()))
    }

    fn create_instance(
        &self,
        _namespace: &NamespaceName,
        _path: &ObjectPath,
        _instance: &Instance,
    ) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn modify_instance(
        &self,
        _namespace: &NamespaceName,
        _path: &ObjectPath,
        _instance: &Instance,
    ) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn delete_instance(&self, _namespace: &NamespaceName, _path: &ObjectPath) -> StoreResult<()> {
        Err(StoreError::ReadOnly)
    }

    fn list_instance_paths(
        &self,
        namespace: &NamespaceName,
        _class: &CimName,
    ) -> StoreResult<Vec<ObjectPath>> {
        self.namespace(namespace)?;
        Ok(Vec::new())
    }

    fn reference_entries(
        &self,
        namespace: &NamespaceName,
        _from_path: &ObjectPath,
    ) -> StoreResult<Vec<InstanceAssociation>> {
        self.namespace(namespace)?;
        Ok(Vec::new())
    }

    fn class_reference_entries(
        &self,
        namespace: &NamespaceName,
        from_class: &CimName,
    ) -> StoreResult<Vec<ClassAssociation>> {
        Ok(self
            .namespace(namespace)?
            .class_assocs
            .iter()
            .filter(|e| e.from_class == *from_class)
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for ReadOnlyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOnlyStore")
            .field("namespace_count", &self.namespaces.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimrepo_types::{CimType, Feature, Property, Qualifier};

    fn name(s: &str) -> CimName {
        CimName::new(s).unwrap()
    }

    fn ns(s: &str) -> NamespaceName {
        NamespaceName::new(s).unwrap()
    }

    fn schema_store() -> ReadOnlyStore {
        let class = ClassDefinition::new(name("Disk")).with_feature(Feature::Property(Property {
            name: name("DeviceID"),
            cim_type: CimType::String,
            value: None,
            array_size: None,
            qualifiers: vec![Qualifier::flag("Key").unwrap()],
        }));
        let key_decl = QualifierDeclaration::new(name("Key"), CimType::Boolean);
        ReadOnlyStore::builder()
            .namespace(ns("root/schema"), vec![key_decl], vec![class])
            .build()
    }

    #[test]
    fn serves_compiled_in_schema() {
        let store = schema_store();
        assert!(store.namespace_exists(&ns("ROOT/schema")).unwrap());
        assert_eq!(
            store.read_class(&ns("root/schema"), &name("disk")).unwrap().name,
            name("Disk")
        );
        assert_eq!(store.list_qualifiers(&ns("root/schema")).unwrap().len(), 1);
    }

    #[test]
    fn rejects_every_mutation() {
        let store = schema_store();
        let nsn = ns("root/schema");
        assert!(matches!(
            store.create_namespace(&ns("root/new")),
            Err(StoreError::ReadOnly)
        ));
        assert!(matches!(
            store.delete_class(&nsn, &name("Disk")),
            Err(StoreError::ReadOnly)
        ));
        assert!(matches!(
            store.write_qualifier(
                &nsn,
                &QualifierDeclaration::new(name("Abstract"), CimType::Boolean)
            ),
            Err(StoreError::ReadOnly)
        ));
        // Schema untouched.
        assert!(store.read_class(&nsn, &name("Disk")).is_ok());
    }

    #[test]
    fn holds_no_instances() {
        let store = schema_store();
        let nsn = ns("root/schema");
        assert!(store
            .list_instance_paths(&nsn, &name("Disk"))
            .unwrap()
            .is_empty());
        let path = ObjectPath::class(name("Disk"));
        assert!(matches!(
            store.read_instance(&nsn, &path),
            Err(StoreError::InstanceNotFound(_))
        ));
    }
}
