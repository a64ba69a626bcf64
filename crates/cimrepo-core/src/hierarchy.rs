//! Superclass-chain and subclass-closure walks over the persistent store.
//!
//! A valid store holds a forest; a corrupted one could dangle or cycle.
//! Both walks carry a visited set and surface `InvalidClassHierarchy`
//! instead of recursing unboundedly.

use std::collections::HashSet;

use cimrepo_store::{PersistentStore, StoreError};
use cimrepo_types::{CimName, ClassDefinition, NamespaceName};

use crate::error::{RepositoryError, RepositoryResult};

/// Read the inheritance chain of `class`, leaf first, root last.
///
/// A missing leaf is `ClassNotFound`; a missing or repeated ancestor is
/// `InvalidClassHierarchy` (the store itself is inconsistent).
pub fn inheritance_chain(
    store: &dyn PersistentStore,
    namespace: &NamespaceName,
    class: &CimName,
) -> RepositoryResult<Vec<ClassDefinition>> {
    let mut chain = vec![store.read_class(namespace, class)?];
    let mut visited: HashSet<CimName> = HashSet::from([class.clone()]);

    while let Some(super_name) = chain.last().and_then(|c| c.super_class.clone()) {
        if !visited.insert(super_name.clone()) {
            return Err(RepositoryError::InvalidClassHierarchy(format!(
                "superclass cycle through {super_name}"
            )));
        }
        let ancestor = store.read_class(namespace, &super_name).map_err(|e| match e {
            StoreError::ClassNotFound(name) => RepositoryError::InvalidClassHierarchy(format!(
                "dangling superclass reference: {name}"
            )),
            other => other.into(),
        })?;
        chain.push(ancestor);
    }
    Ok(chain)
}

/// Names of every direct and transitive subclass of `root`, optionally
/// including `root` itself. Order is breadth-first from the root.
pub fn subclass_closure(
    store: &dyn PersistentStore,
    namespace: &NamespaceName,
    root: &CimName,
    include_root: bool,
) -> RepositoryResult<Vec<CimName>> {
    // Collect super pointers once; the closure is then a pure graph walk.
    let all_names = store.list_class_names(namespace)?;
    let mut parents: Vec<(CimName, CimName)> = Vec::with_capacity(all_names.len());
    for name in &all_names {
        let class = store.read_class(namespace, name)?;
        if let Some(super_name) = class.super_class {
            parents.push((name.clone(), super_name));
        }
    }

    let mut closure: Vec<CimName> = Vec::new();
    let mut frontier: Vec<CimName> = vec![root.clone()];
    let mut seen: HashSet<CimName> = HashSet::from([root.clone()]);
    while let Some(current) = frontier.pop() {
        for (child, parent) in &parents {
            if *parent == current && seen.insert(child.clone()) {
                closure.push(child.clone());
                frontier.push(child.clone());
            }
        }
    }

    if include_root {
        closure.insert(0, root.clone());
    }
    Ok(closure)
}

/// Whether any class in the namespace names `class` as its superclass.
pub fn has_subclasses(
    store: &dyn PersistentStore,
    namespace: &NamespaceName,
    class: &CimName,
) -> RepositoryResult<bool> {
    for name in store.list_class_names(namespace)? {
        let candidate = store.read_class(namespace, &name)?;
        if candidate.super_class.as_ref() == Some(class) {
            return Ok(true);
        }
    }
    Ok(false)
}
