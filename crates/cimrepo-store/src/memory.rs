use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use cimrepo_types::{
    CimName, ClassDefinition, Instance, NamespaceName, ObjectPath, QualifierDeclaration,
};

use crate::assoc::{
    class_association_entries, instance_association_entries, ClassAssociation,
    InstanceAssociation,
};
use crate::error::{StoreError, StoreResult};
use crate::traits::PersistentStore;

#[derive(Default)]
struct NamespaceData {
    read_only: bool,
    qualifiers: HashMap<CimName, QualifierDeclaration>,
    classes: HashMap<CimName, ClassDefinition>,
    /// Per class: canonical path string -> (path, instance).
    instances: HashMap<CimName, HashMap<String, (ObjectPath, Instance)>>,
    class_assocs: Vec<ClassAssociation>,
    instance_assocs: Vec<InstanceAssociation>,
}

/// In-memory, HashMap-based persistent store.
///
/// Intended for tests and embedding. All state is held behind a single
/// `RwLock`; every mutation validates fully before touching state, so a
/// failed operation leaves nothing half-written and the primary object and
/// its association index entries always change together.
pub struct InMemoryStore {
    namespaces: RwLock<HashMap<NamespaceName, NamespaceData>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Total instances across all namespaces and classes.
    pub fn instance_count(&self) -> usize {
        let map = self.namespaces.read().expect("lock poisoned");
        map.values()
            .flat_map(|ns| ns.instances.values())
            .map(|by_path| by_path.len())
            .sum()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn namespace<'a>(
    map: &'a HashMap<NamespaceName, NamespaceData>,
    name: &NamespaceName,
) -> StoreResult<&'a NamespaceData> {
    map.get(name)
        .ok_or_else(|| StoreError::NamespaceNotFound(name.clone()))
}

fn namespace_mut<'a>(
    map: &'a mut HashMap<NamespaceName, NamespaceData>,
    name: &NamespaceName,
) -> StoreResult<&'a mut NamespaceData> {
    let ns = map
        .get_mut(name)
        .ok_or_else(|| StoreError::NamespaceNotFound(name.clone()))?;
    if ns.read_only {
        return Err(StoreError::ReadOnly);
    }
    Ok(ns)
}

impl PersistentStore for InMemoryStore {
    fn create_namespace(&self, name: &NamespaceName) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        if map.contains_key(name) {
            return Err(StoreError::NamespaceExists(name.clone()));
        }
        map.insert(name.clone(), NamespaceData::default());
        debug!(namespace = %name, "namespace created");
        Ok(())
    }

    fn modify_namespace(&self, name: &NamespaceName, read_only: bool) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = map
            .get_mut(name)
            .ok_or_else(|| StoreError::NamespaceNotFound(name.clone()))?;
        ns.read_only = read_only;
        Ok(())
    }

    fn delete_namespace(&self, name: &NamespaceName) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace(&map, name)?;
        if !ns.classes.is_empty() {
            return Err(StoreError::NamespaceNotEmpty(name.clone()));
        }
        map.remove(name);
        debug!(namespace = %name, "namespace deleted");
        Ok(())
    }

    fn list_namespaces(&self) -> StoreResult<Vec<NamespaceName>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let mut names: Vec<NamespaceName> = map.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn namespace_exists(&self, name: &NamespaceName) -> StoreResult<bool> {
        let map = self.namespaces.read().expect("lock poisoned");
        Ok(map.contains_key(name))
    }

    fn read_qualifier(
        &self,
        namespace_name: &NamespaceName,
        name: &CimName,
    ) -> StoreResult<QualifierDeclaration> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        ns.qualifiers
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::QualifierNotFound(name.clone()))
    }

    fn write_qualifier(
        &self,
        namespace_name: &NamespaceName,
        declaration: &QualifierDeclaration,
    ) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        ns.qualifiers
            .insert(declaration.name.clone(), declaration.clone());
        debug!(namespace = %namespace_name, qualifier = %declaration.name, "qualifier written");
        Ok(())
    }

    fn delete_qualifier(&self, namespace_name: &NamespaceName, name: &CimName) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        if ns.qualifiers.remove(name).is_none() {
            return Err(StoreError::QualifierNotFound(name.clone()));
        }
        debug!(namespace = %namespace_name, qualifier = %name, "qualifier deleted");
        Ok(())
    }

    fn list_qualifiers(
        &self,
        namespace_name: &NamespaceName,
    ) -> StoreResult<Vec<QualifierDeclaration>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        let mut decls: Vec<QualifierDeclaration> = ns.qualifiers.values().cloned().collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(decls)
    }

    fn read_class(
        &self,
        namespace_name: &NamespaceName,
        name: &CimName,
    ) -> StoreResult<ClassDefinition> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        ns.classes
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ClassNotFound(name.clone()))
    }

    fn create_class(
        &self,
        namespace_name: &NamespaceName,
        class: &ClassDefinition,
    ) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        if ns.classes.contains_key(&class.name) {
            return Err(StoreError::ClassExists(class.name.clone()));
        }
        // Primary object and index entries change together under the lock.
        ns.class_assocs.extend(class_association_entries(class));
        ns.classes.insert(class.name.clone(), class.clone());
        debug!(namespace = %namespace_name, class = %class.name, "class created");
        Ok(())
    }

    fn modify_class(
        &self,
        namespace_name: &NamespaceName,
        class: &ClassDefinition,
    ) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        if !ns.classes.contains_key(&class.name) {
            return Err(StoreError::ClassNotFound(class.name.clone()));
        }
        ns.class_assocs.retain(|e| e.assoc_class != class.name);
        ns.class_assocs.extend(class_association_entries(class));
        ns.classes.insert(class.name.clone(), class.clone());
        debug!(namespace = %namespace_name, class = %class.name, "class modified");
        Ok(())
    }

    fn delete_class(&self, namespace_name: &NamespaceName, name: &CimName) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        if ns.classes.remove(name).is_none() {
            return Err(StoreError::ClassNotFound(name.clone()));
        }
        // The class's instances and the index entries they carried go
        // with it.
        ns.instances.remove(name);
        ns.class_assocs.retain(|e| e.assoc_class != *name);
        ns.instance_assocs
            .retain(|e| e.assoc_path.class_name != *name);
        debug!(namespace = %namespace_name, class = %name, "class deleted");
        Ok(())
    }

    fn list_class_names(&self, namespace_name: &NamespaceName) -> StoreResult<Vec<CimName>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        let mut names: Vec<CimName> = ns.classes.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn read_instance(
        &self,
        namespace_name: &NamespaceName,
        path: &ObjectPath,
    ) -> StoreResult<Instance> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        ns.instances
            .get(&path.class_name)
            .and_then(|by_path| by_path.get(&path.canonical()))
            .map(|(_, instance)| instance.clone())
            .ok_or_else(|| StoreError::InstanceNotFound(path.to_string()))
    }

    fn create_instance(
        &self,
        namespace_name: &NamespaceName,
        path: &ObjectPath,
        instance: &Instance,
    ) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        let class = ns
            .classes
            .get(&instance.class_name)
            .ok_or_else(|| StoreError::ClassNotFound(instance.class_name.clone()))?;
        let is_association = class.is_association;

        let by_path = ns.instances.entry(path.class_name.clone()).or_default();
        let key = path.canonical();
        if by_path.contains_key(&key) {
            return Err(StoreError::InstanceExists(path.to_string()));
        }
        by_path.insert(key, (path.clone(), instance.clone()));
        if is_association {
            ns.instance_assocs
                .extend(instance_association_entries(path, instance));
        }
        debug!(namespace = %namespace_name, path = %path, "instance created");
        Ok(())
    }

    fn modify_instance(
        &self,
        namespace_name: &NamespaceName,
        path: &ObjectPath,
        instance: &Instance,
    ) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        let is_association = ns
            .classes
            .get(&instance.class_name)
            .ok_or_else(|| StoreError::ClassNotFound(instance.class_name.clone()))?
            .is_association;

        let by_path = ns
            .instances
            .get_mut(&path.class_name)
            .ok_or_else(|| StoreError::InstanceNotFound(path.to_string()))?;
        let key = path.canonical();
        if !by_path.contains_key(&key) {
            return Err(StoreError::InstanceNotFound(path.to_string()));
        }
        by_path.insert(key, (path.clone(), instance.clone()));
        ns.instance_assocs.retain(|e| e.assoc_path != *path);
        if is_association {
            ns.instance_assocs
                .extend(instance_association_entries(path, instance));
        }
        debug!(namespace = %namespace_name, path = %path, "instance modified");
        Ok(())
    }

    fn delete_instance(&self, namespace_name: &NamespaceName, path: &ObjectPath) -> StoreResult<()> {
        let mut map = self.namespaces.write().expect("lock poisoned");
        let ns = namespace_mut(&mut map, namespace_name)?;
        let removed = ns
            .instances
            .get_mut(&path.class_name)
            .and_then(|by_path| by_path.remove(&path.canonical()));
        if removed.is_none() {
            return Err(StoreError::InstanceNotFound(path.to_string()));
        }
        ns.instance_assocs.retain(|e| e.assoc_path != *path);
        debug!(namespace = %namespace_name, path = %path, "instance deleted");
        Ok(())
    }

    fn list_instance_paths(
        &self,
        namespace_name: &NamespaceName,
        class: &CimName,
    ) -> StoreResult<Vec<ObjectPath>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        let mut paths: Vec<ObjectPath> = ns
            .instances
            .get(class)
            .map(|by_path| by_path.values().map(|(p, _)| p.clone()).collect())
            .unwrap_or_default();
        paths.sort_by_key(|p| p.canonical());
        Ok(paths)
    }

    fn reference_entries(
        &self,
        namespace_name: &NamespaceName,
        from_path: &ObjectPath,
    ) -> StoreResult<Vec<InstanceAssociation>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        Ok(ns
            .instance_assocs
            .iter()
            .filter(|e| e.from_path == *from_path)
            .cloned()
            .collect())
    }

    fn class_reference_entries(
        &self,
        namespace_name: &NamespaceName,
        from_class: &CimName,
    ) -> StoreResult<Vec<ClassAssociation>> {
        let map = self.namespaces.read().expect("lock poisoned");
        let ns = namespace(&map, namespace_name)?;
        Ok(ns
            .class_assocs
            .iter()
            .filter(|e| e.from_class == *from_class)
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.namespaces.read().expect("lock poisoned");
        f.debug_struct("InMemoryStore")
            .field("namespace_count", &map.len())
            .finish()
    }
}
