use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use cimrepo_cache::ObjectCache;
use cimrepo_resolver::{make_resolved_class, ResolveLimits, ResolveOptions};
use cimrepo_store::PersistentStore;
use cimrepo_types::{
    CimName, ClassDefinition, Instance, KeyBinding, KeyValue, NamespaceName, ObjectPath,
    QualifierDeclaration, ResolvedClass, Value,
};

use crate::error::{RepositoryError, RepositoryResult};
use crate::hierarchy;
use crate::view::{derive_class_view, validate_property_list, ClassView};

/// Cache capacities and resolution limits, fixed at construction.
#[derive(Clone, Copy, Debug)]
pub struct RepositoryConfig {
    /// Resolved-class cache capacity; 0 disables class caching.
    pub class_cache_size: usize,
    /// Qualifier-declaration cache capacity.
    pub qualifier_cache_size: usize,
    /// Instance cache capacity.
    pub instance_cache_size: usize,
    pub limits: ResolveLimits,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            class_cache_size: 32,
            qualifier_cache_size: 80,
            instance_cache_size: 128,
            limits: ResolveLimits::default(),
        }
    }
}

/// Filters for associator queries. `None` means unfiltered. Class filters
/// match the named class or any of its subclasses.
#[derive(Clone, Debug, Default)]
pub struct AssociationFilter {
    pub assoc_class: Option<CimName>,
    pub result_class: Option<CimName>,
    pub role: Option<CimName>,
    pub result_role: Option<CimName>,
}

/// The object repository: orchestrates the persistent store, the class
/// resolver, and the object caches under one reader/writer lock.
///
/// Read operations run under the shared lock (store reads on a cache miss
/// included); mutating operations hold the exclusive lock for exactly the
/// store mutation plus the cache invalidation it requires. The caches
/// serialize internally on their own mutex, independent of this lock.
///
/// The class cache holds one shape per class: the canonical fully-resolved
/// form. Narrower views are derived from it per request.
pub struct Repository {
    store: Arc<dyn PersistentStore>,
    lock: RwLock<()>,
    class_cache: ObjectCache<ResolvedClass>,
    qualifier_cache: ObjectCache<QualifierDeclaration>,
    instance_cache: ObjectCache<Instance>,
    limits: ResolveLimits,
}

fn name_cache_key(namespace: &NamespaceName, class: &CimName) -> String {
    format!("{}:{}", namespace.folded(), class.folded())
}

fn instance_cache_key(namespace: &NamespaceName, path: &ObjectPath) -> String {
    format!("{}:{}", namespace.folded(), path.canonical())
}

impl Repository {
    pub fn new(store: Arc<dyn PersistentStore>, config: RepositoryConfig) -> Self {
        Self {
            store,
            lock: RwLock::new(()),
            class_cache: ObjectCache::new(config.class_cache_size),
            qualifier_cache: ObjectCache::new(config.qualifier_cache_size),
            instance_cache: ObjectCache::new(config.instance_cache_size),
            limits: config.limits,
        }
    }

    // -- Classes ------------------------------------------------------------

    /// Fetch a class in the requested view.
    pub fn get_class(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
        view: &ClassView,
    ) -> RepositoryResult<ResolvedClass> {
        let _guard = self.lock.read();
        validate_property_list(view.property_list.as_deref())?;
        let canonical = self.canonical_class(namespace, class)?;
        Ok(derive_class_view(canonical, view))
    }

    /// All classes of the namespace in the requested view, ordered by name.
    pub fn enumerate_classes(
        &self,
        namespace: &NamespaceName,
        view: &ClassView,
    ) -> RepositoryResult<Vec<ResolvedClass>> {
        let _guard = self.lock.read();
        validate_property_list(view.property_list.as_deref())?;
        let mut classes = Vec::new();
        for name in self.store.list_class_names(namespace)? {
            let canonical = self.canonical_class(namespace, &name)?;
            classes.push(derive_class_view(canonical, view));
        }
        Ok(classes)
    }

    pub fn enumerate_class_names(
        &self,
        namespace: &NamespaceName,
    ) -> RepositoryResult<Vec<CimName>> {
        let _guard = self.lock.read();
        Ok(self.store.list_class_names(namespace)?)
    }

    /// Create a class. The superclass, if named, must already exist and
    /// resolve cleanly; the association flag is inherited from it.
    pub fn create_class(
        &self,
        namespace: &NamespaceName,
        class: &ClassDefinition,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        let class = self.prepare_class(namespace, class)?;
        self.store.create_class(namespace, &class)?;
        // A new class cannot stale existing resolved views: its superclass
        // pre-existed and it has no subclasses yet.
        self.class_cache.evict(&name_cache_key(namespace, &class.name));
        info!(namespace = %namespace, class = %class.name, "class created");
        Ok(())
    }

    /// Replace a class definition. The superclass cannot change, and the
    /// class cannot flip between association and non-association: existing
    /// instances carry index entries keyed on that flag.
    pub fn modify_class(
        &self,
        namespace: &NamespaceName,
        class: &ClassDefinition,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        let old = self.store.read_class(namespace, &class.name)?;
        if old.super_class != class.super_class {
            return Err(RepositoryError::InvalidParameter(format!(
                "superclass of {} cannot change",
                class.name
            )));
        }
        let class = self.prepare_class(namespace, class)?;
        if old.is_association != class.is_association {
            return Err(RepositoryError::InvalidParameter(format!(
                "association flag of {} cannot change",
                class.name
            )));
        }
        self.store.modify_class(namespace, &class)?;
        // Modifying this class may invalidate cached resolved views of its
        // descendants; identifying them needs a hierarchy walk, so flush
        // the whole class cache instead.
        self.class_cache.clear();
        info!(namespace = %namespace, class = %class.name, "class modified");
        Ok(())
    }

    /// Delete a class and its instances. Fails while a subclass exists.
    pub fn delete_class(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        self.store.read_class(namespace, class)?;
        if hierarchy::has_subclasses(self.store.as_ref(), namespace, class)? {
            return Err(RepositoryError::InvalidClassHierarchy(format!(
                "class {class} has subclasses"
            )));
        }
        self.store.delete_class(namespace, class)?;
        // No subclass views can be cached (the delete would have failed),
        // so the class's own entry is the only stale one. Its instances
        // went with it; drop the instance cache wholesale.
        self.class_cache.evict(&name_cache_key(namespace, class));
        self.instance_cache.clear();
        info!(namespace = %namespace, class = %class, "class deleted");
        Ok(())
    }

    // -- Instances ----------------------------------------------------------

    /// Fetch an instance, optionally narrowed to a property subset. The
    /// filter is applied per request; the cache keeps the full instance.
    pub fn get_instance(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        property_list: Option<&[CimName]>,
    ) -> RepositoryResult<Instance> {
        let _guard = self.lock.read();
        validate_property_list(property_list)?;
        let path = self.normalize_path(namespace, path);
        let mut instance = self.read_instance_cached(namespace, &path)?;
        if let Some(wanted) = property_list {
            instance.retain_properties(wanted);
        }
        Ok(instance)
    }

    /// Create an instance; its object path is built from the resolved
    /// class's key properties and returned.
    pub fn create_instance(
        &self,
        namespace: &NamespaceName,
        instance: &Instance,
    ) -> RepositoryResult<ObjectPath> {
        let _guard = self.lock.write();
        let resolved = self.canonical_class(namespace, &instance.class_name)?;
        let instance = normalize_reference_values(namespace, instance);
        let path = build_instance_path(&resolved, &instance)?;
        self.store.create_instance(namespace, &path, &instance)?;
        self.instance_cache.evict(&instance_cache_key(namespace, &path));
        debug!(namespace = %namespace, path = %path, "instance created");
        Ok(path.with_namespace(namespace.clone()))
    }

    /// Replace an instance's properties. The key bindings derived from the
    /// new property values must match `path`: instance identity is fixed.
    pub fn modify_instance(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        instance: &Instance,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        let resolved = self.canonical_class(namespace, &instance.class_name)?;
        let instance = normalize_reference_values(namespace, instance);
        let derived = build_instance_path(&resolved, &instance)?;
        let target = self.normalize_path(namespace, path);
        if derived != target {
            return Err(RepositoryError::InvalidParameter(format!(
                "key bindings of {target} cannot change"
            )));
        }
        self.store.modify_instance(namespace, &target, &instance)?;
        self.instance_cache
            .evict(&instance_cache_key(namespace, &target));
        debug!(namespace = %namespace, path = %target, "instance modified");
        Ok(())
    }

    pub fn delete_instance(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        let path = self.normalize_path(namespace, path);
        self.store.delete_instance(namespace, &path)?;
        self.instance_cache.evict(&instance_cache_key(namespace, &path));
        debug!(namespace = %namespace, path = %path, "instance deleted");
        Ok(())
    }

    /// Instances of exactly `class`, no subclass expansion.
    pub fn enumerate_instances_for_class(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> RepositoryResult<Vec<Instance>> {
        let _guard = self.lock.read();
        self.store.read_class(namespace, class)?;
        self.instances_of(namespace, std::slice::from_ref(class))
    }

    /// Instances of `class` and every transitive subclass.
    pub fn enumerate_instances_for_subtree(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> RepositoryResult<Vec<Instance>> {
        let _guard = self.lock.read();
        self.store.read_class(namespace, class)?;
        let closure = hierarchy::subclass_closure(self.store.as_ref(), namespace, class, true)?;
        self.instances_of(namespace, &closure)
    }

    pub fn enumerate_instance_names_for_class(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let _guard = self.lock.read();
        self.store.read_class(namespace, class)?;
        self.instance_names_of(namespace, std::slice::from_ref(class))
    }

    pub fn enumerate_instance_names_for_subtree(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let _guard = self.lock.read();
        self.store.read_class(namespace, class)?;
        let closure = hierarchy::subclass_closure(self.store.as_ref(), namespace, class, true)?;
        self.instance_names_of(namespace, &closure)
    }

    // -- Associations -------------------------------------------------------

    /// Instances related to `path` through an association instance,
    /// filtered per `filter`.
    pub fn associators(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        filter: &AssociationFilter,
    ) -> RepositoryResult<Vec<Instance>> {
        let _guard = self.lock.read();
        let targets = self.associator_targets(namespace, path, filter)?;
        targets
            .into_iter()
            .map(|p| self.read_instance_cached(namespace, &p))
            .collect()
    }

    /// Paths of the instances [`associators`](Self::associators) would
    /// return.
    pub fn associator_names(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        filter: &AssociationFilter,
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let _guard = self.lock.read();
        let targets = self.associator_targets(namespace, path, filter)?;
        Ok(targets
            .into_iter()
            .map(|p| p.with_namespace(namespace.clone()))
            .collect())
    }

    /// Association instances that reference `path`, filtered by
    /// association class (or subclass) and role.
    pub fn references(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        result_class: Option<&CimName>,
        role: Option<&CimName>,
    ) -> RepositoryResult<Vec<Instance>> {
        let _guard = self.lock.read();
        let assoc_paths = self.reference_sources(namespace, path, result_class, role)?;
        assoc_paths
            .into_iter()
            .map(|p| self.read_instance_cached(namespace, &p))
            .collect()
    }

    /// Paths of the association instances [`references`](Self::references)
    /// would return.
    pub fn reference_names(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        result_class: Option<&CimName>,
        role: Option<&CimName>,
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let _guard = self.lock.read();
        let assoc_paths = self.reference_sources(namespace, path, result_class, role)?;
        Ok(assoc_paths
            .into_iter()
            .map(|p| p.with_namespace(namespace.clone()))
            .collect())
    }

    /// Names of association classes carrying a reference that can point at
    /// `class` or one of its superclasses, optionally filtered by role.
    /// The schema-level counterpart of [`references`](Self::references).
    pub fn reference_classes(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
        role: Option<&CimName>,
    ) -> RepositoryResult<Vec<CimName>> {
        let _guard = self.lock.read();
        let chain = hierarchy::inheritance_chain(self.store.as_ref(), namespace, class)?;
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for link in &chain {
            for entry in self.store.class_reference_entries(namespace, &link.name)? {
                if let Some(role) = role {
                    if entry.from_role != *role {
                        continue;
                    }
                }
                if seen.insert(entry.assoc_class.clone()) {
                    names.push(entry.assoc_class);
                }
            }
        }
        Ok(names)
    }

    // -- Qualifier declarations --------------------------------------------

    pub fn get_qualifier(
        &self,
        namespace: &NamespaceName,
        name: &CimName,
    ) -> RepositoryResult<QualifierDeclaration> {
        let _guard = self.lock.read();
        let key = name_cache_key(namespace, name);
        if let Some(declaration) = self.qualifier_cache.get(&key) {
            return Ok(declaration);
        }
        let declaration = self.store.read_qualifier(namespace, name)?;
        self.qualifier_cache.put(&key, declaration.clone());
        Ok(declaration)
    }

    /// Create or replace a qualifier declaration (write-through cached).
    pub fn set_qualifier(
        &self,
        namespace: &NamespaceName,
        declaration: &QualifierDeclaration,
    ) -> RepositoryResult<()> {
        declaration
            .flavor
            .validate()
            .map_err(|e| RepositoryError::InvalidParameter(e.to_string()))?;
        let _guard = self.lock.write();
        self.store.write_qualifier(namespace, declaration)?;
        self.qualifier_cache.put(
            &name_cache_key(namespace, &declaration.name),
            declaration.clone(),
        );
        debug!(namespace = %namespace, qualifier = %declaration.name, "qualifier set");
        Ok(())
    }

    pub fn delete_qualifier(
        &self,
        namespace: &NamespaceName,
        name: &CimName,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        self.store.delete_qualifier(namespace, name)?;
        self.qualifier_cache.evict(&name_cache_key(namespace, name));
        debug!(namespace = %namespace, qualifier = %name, "qualifier deleted");
        Ok(())
    }

    pub fn enumerate_qualifiers(
        &self,
        namespace: &NamespaceName,
    ) -> RepositoryResult<Vec<QualifierDeclaration>> {
        let _guard = self.lock.read();
        Ok(self.store.list_qualifiers(namespace)?)
    }

    // -- Namespaces ---------------------------------------------------------

    pub fn create_namespace(&self, namespace: &NamespaceName) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        self.store.create_namespace(namespace)?;
        info!(namespace = %namespace, "namespace created");
        Ok(())
    }

    /// Update namespace attributes (the read-only flag).
    pub fn modify_namespace(
        &self,
        namespace: &NamespaceName,
        read_only: bool,
    ) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        self.store.modify_namespace(namespace, read_only)?;
        self.clear_caches();
        info!(namespace = %namespace, read_only, "namespace modified");
        Ok(())
    }

    /// Delete a namespace; it must contain no classes.
    pub fn delete_namespace(&self, namespace: &NamespaceName) -> RepositoryResult<()> {
        let _guard = self.lock.write();
        self.store.delete_namespace(namespace)?;
        self.clear_caches();
        info!(namespace = %namespace, "namespace deleted");
        Ok(())
    }

    pub fn enumerate_namespaces(&self) -> RepositoryResult<Vec<NamespaceName>> {
        let _guard = self.lock.read();
        Ok(self.store.list_namespaces()?)
    }

    // -- Internal helpers (callers hold the repository lock) ----------------

    /// The canonical fully-resolved form of a class: cache hit, or store
    /// read plus resolution plus cache population.
    fn canonical_class(
        &self,
        namespace: &NamespaceName,
        class: &CimName,
    ) -> RepositoryResult<ResolvedClass> {
        let key = name_cache_key(namespace, class);
        if let Some(resolved) = self.class_cache.get(&key) {
            return Ok(resolved);
        }
        debug!(namespace = %namespace, class = %class, "class cache miss");
        let chain = hierarchy::inheritance_chain(self.store.as_ref(), namespace, class)?;
        let chain_refs: Vec<&ClassDefinition> = chain.iter().collect();
        let declarations: HashMap<CimName, QualifierDeclaration> = self
            .store
            .list_qualifiers(namespace)?
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        let resolved = make_resolved_class(
            &chain_refs,
            &declarations,
            &ResolveOptions::canonical(),
            self.limits,
        )?;
        self.class_cache.put(&key, resolved.clone());
        Ok(resolved)
    }

    /// Validate a class for create/modify and derive its association flag
    /// from its qualifiers and ancestors.
    fn prepare_class(
        &self,
        namespace: &NamespaceName,
        class: &ClassDefinition,
    ) -> RepositoryResult<ClassDefinition> {
        let mut class = class.clone();
        if let Some(super_name) = class.super_class.clone() {
            let super_chain =
                hierarchy::inheritance_chain(self.store.as_ref(), namespace, &super_name)
                    .map_err(|e| match e {
                        RepositoryError::ClassNotFound(name) => {
                            RepositoryError::InvalidClassHierarchy(format!(
                                "superclass not found: {name}"
                            ))
                        }
                        other => other,
                    })?;
            if super_chain.iter().any(|c| c.is_association) {
                class.is_association = true;
            }
        }
        let flagged = class
            .qualifiers
            .iter()
            .any(|q| q.name.matches("Association") && q.value.is_true());
        if flagged {
            class.is_association = true;
        }
        Ok(class)
    }

    fn read_instance_cached(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
    ) -> RepositoryResult<Instance> {
        let key = instance_cache_key(namespace, path);
        if let Some(instance) = self.instance_cache.get(&key) {
            return Ok(instance);
        }
        let instance = self.store.read_instance(namespace, path)?;
        self.instance_cache.put(&key, instance.clone());
        Ok(instance)
    }

    fn normalize_path(&self, namespace: &NamespaceName, path: &ObjectPath) -> ObjectPath {
        let mut path = path.clone();
        path.strip_namespace(namespace);
        path
    }

    fn instances_of(
        &self,
        namespace: &NamespaceName,
        classes: &[CimName],
    ) -> RepositoryResult<Vec<Instance>> {
        let mut instances = Vec::new();
        for class in classes {
            for path in self.store.list_instance_paths(namespace, class)? {
                instances.push(self.read_instance_cached(namespace, &path)?);
            }
        }
        Ok(instances)
    }

    fn instance_names_of(
        &self,
        namespace: &NamespaceName,
        classes: &[CimName],
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let mut names = Vec::new();
        for class in classes {
            for path in self.store.list_instance_paths(namespace, class)? {
                names.push(path.with_namespace(namespace.clone()));
            }
        }
        Ok(names)
    }

    /// Expand a class filter to the named class plus all subclasses.
    fn class_filter_set(
        &self,
        namespace: &NamespaceName,
        class: Option<&CimName>,
    ) -> RepositoryResult<Option<Vec<CimName>>> {
        match class {
            None => Ok(None),
            Some(class) => {
                self.store.read_class(namespace, class)?;
                Ok(Some(hierarchy::subclass_closure(
                    self.store.as_ref(),
                    namespace,
                    class,
                    true,
                )?))
            }
        }
    }

    /// Deduplicated target paths of an associator query, in index order.
    fn associator_targets(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        filter: &AssociationFilter,
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let from = self.normalize_path(namespace, path);
        let assoc_set = self.class_filter_set(namespace, filter.assoc_class.as_ref())?;
        let result_set = self.class_filter_set(namespace, filter.result_class.as_ref())?;

        let mut seen = std::collections::HashSet::new();
        let mut targets = Vec::new();
        for entry in self.store.reference_entries(namespace, &from)? {
            if let Some(role) = &filter.role {
                if entry.from_role != *role {
                    continue;
                }
            }
            if let Some(result_role) = &filter.result_role {
                if entry.to_role != *result_role {
                    continue;
                }
            }
            if let Some(set) = &assoc_set {
                if !set.contains(&entry.assoc_class) {
                    continue;
                }
            }
            if let Some(set) = &result_set {
                if !set.contains(&entry.to_class) {
                    continue;
                }
            }
            if seen.insert(entry.to_path.canonical()) {
                targets.push(entry.to_path);
            }
        }
        Ok(targets)
    }

    /// Deduplicated association-instance paths referencing `path`.
    fn reference_sources(
        &self,
        namespace: &NamespaceName,
        path: &ObjectPath,
        result_class: Option<&CimName>,
        role: Option<&CimName>,
    ) -> RepositoryResult<Vec<ObjectPath>> {
        let from = self.normalize_path(namespace, path);
        let result_set = self.class_filter_set(namespace, result_class)?;

        let mut seen = std::collections::HashSet::new();
        let mut sources = Vec::new();
        for entry in self.store.reference_entries(namespace, &from)? {
            if let Some(role) = role {
                if entry.from_role != *role {
                    continue;
                }
            }
            if let Some(set) = &result_set {
                if !set.contains(&entry.assoc_class) {
                    continue;
                }
            }
            if seen.insert(entry.assoc_path.canonical()) {
                sources.push(entry.assoc_path);
            }
        }
        Ok(sources)
    }

    fn clear_caches(&self) {
        self.class_cache.clear();
        self.qualifier_cache.clear();
        self.instance_cache.clear();
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("class_cache", &self.class_cache)
            .field("instance_cache", &self.instance_cache)
            .finish()
    }
}

/// Strip the local namespace from reference-valued properties so that
/// association index entries compare equal regardless of spelling.
fn normalize_reference_values(namespace: &NamespaceName, instance: &Instance) -> Instance {
    let mut normalized = Instance::new(instance.class_name.clone());
    for (name, value) in instance.properties() {
        let value = match value {
            Value::Reference(path) => {
                let mut path = path.clone();
                path.strip_namespace(namespace);
                Value::Reference(path)
            }
            other => other.clone(),
        };
        normalized.set_property(name.clone(), value);
    }
    normalized
}

/// Build an instance's object path from its class's key properties.
fn build_instance_path(
    class: &ResolvedClass,
    instance: &Instance,
) -> RepositoryResult<ObjectPath> {
    let key_names = class.key_property_names();
    if key_names.is_empty() {
        return Err(RepositoryError::InvalidParameter(format!(
            "class {} has no key properties",
            class.name
        )));
    }
    let mut bindings = Vec::with_capacity(key_names.len());
    for key in key_names {
        let value = instance.property(key.as_str()).ok_or_else(|| {
            RepositoryError::InvalidParameter(format!("missing key property {key}"))
        })?;
        bindings.push(KeyBinding::new(key, key_value(value)?));
    }
    Ok(ObjectPath::new(class.name.clone(), bindings))
}

fn key_value(value: &Value) -> RepositoryResult<KeyValue> {
    let converted = match value {
        Value::Boolean(b) => KeyValue::Boolean(*b),
        Value::Uint32(v) => KeyValue::Number(i64::from(*v)),
        Value::Sint32(v) => KeyValue::Number(i64::from(*v)),
        Value::Sint64(v) => KeyValue::Number(*v),
        Value::Uint64(v) => KeyValue::Number(i64::try_from(*v).map_err(|_| {
            RepositoryError::InvalidParameter(format!("key value {v} out of range"))
        })?),
        Value::String(s) | Value::DateTime(s) => KeyValue::String(s.clone()),
        Value::Reference(path) => KeyValue::Reference(Box::new(path.clone())),
        other => {
            return Err(RepositoryError::InvalidParameter(format!(
                "value {other} cannot be a key binding"
            )))
        }
    };
    Ok(converted)
}
