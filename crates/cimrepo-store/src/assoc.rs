//! Association index entry types and builders.
//!
//! Association-shaped classes and instances are indexed at write time so
//! that associator and reference queries never scan the full object set.
//! For an association instance with N reference-valued properties, one
//! entry is recorded per ordered pair of distinct references (N·(N-1)
//! entries), so a lookup by the "from" side finds every related "to" side
//! directly.

use serde::{Deserialize, Serialize};

use cimrepo_types::{CimName, ClassDefinition, Feature, Instance, ObjectPath, Value};

/// Index entry for one directed leg of an association class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassAssociation {
    pub assoc_class: CimName,
    pub from_class: CimName,
    pub from_role: CimName,
    pub to_class: CimName,
    pub to_role: CimName,
}

/// Index entry for one directed leg of an association instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceAssociation {
    /// Path of the association instance itself.
    pub assoc_path: ObjectPath,
    pub assoc_class: CimName,
    pub from_path: ObjectPath,
    pub from_class: CimName,
    pub from_role: CimName,
    pub to_path: ObjectPath,
    pub to_class: CimName,
    pub to_role: CimName,
}

/// Build the class-level index entries for an association class: one entry
/// per ordered pair of distinct reference features.
pub fn class_association_entries(class: &ClassDefinition) -> Vec<ClassAssociation> {
    let mut entries = Vec::new();
    if !class.is_association {
        return entries;
    }
    let refs: Vec<_> = class
        .features
        .iter()
        .filter_map(|f| match f {
            Feature::Reference(r) => Some(r),
            _ => None,
        })
        .collect();
    for from in &refs {
        for to in &refs {
            if from.name == to.name {
                continue;
            }
            entries.push(ClassAssociation {
                assoc_class: class.name.clone(),
                from_class: from.ref_class.clone(),
                from_role: from.name.clone(),
                to_class: to.ref_class.clone(),
                to_role: to.name.clone(),
            });
        }
    }
    entries
}

/// Build the instance-level index entries for an association instance: one
/// entry per ordered pair of distinct reference-valued properties.
///
/// Reference values are expected to be namespace-stripped already (local
/// references carry no namespace component), so entries compare equal
/// regardless of how the caller spelled the path.
pub fn instance_association_entries(
    assoc_path: &ObjectPath,
    instance: &Instance,
) -> Vec<InstanceAssociation> {
    let refs: Vec<(&CimName, &ObjectPath)> = instance
        .properties()
        .filter_map(|(name, value)| match value {
            Value::Reference(path) => Some((name, path)),
            _ => None,
        })
        .collect();

    let mut entries = Vec::new();
    for (from_role, from_path) in &refs {
        for (to_role, to_path) in &refs {
            if from_role == to_role {
                continue;
            }
            entries.push(InstanceAssociation {
                assoc_path: assoc_path.clone(),
                assoc_class: instance.class_name.clone(),
                from_path: (*from_path).clone(),
                from_class: from_path.class_name.clone(),
                from_role: (*from_role).clone(),
                to_path: (*to_path).clone(),
                to_class: to_path.class_name.clone(),
                to_role: (*to_role).clone(),
            });
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimrepo_types::{CimName, KeyBinding, KeyValue, Reference};

    fn name(s: &str) -> CimName {
        CimName::new(s).unwrap()
    }

    fn instance_path(class: &str, id: i64) -> ObjectPath {
        ObjectPath::new(
            name(class),
            vec![KeyBinding::new(name("Id"), KeyValue::Number(id))],
        )
    }

    fn reference_feature(role: &str, class: &str) -> Feature {
        Feature::Reference(Reference {
            name: name(role),
            ref_class: name(class),
            array_size: None,
            qualifiers: vec![],
        })
    }

    #[test]
    fn non_association_class_yields_no_entries() {
        let class = ClassDefinition::new(name("Disk"));
        assert!(class_association_entries(&class).is_empty());
    }

    #[test]
    fn binary_association_yields_two_class_entries() {
        let class = ClassDefinition::new(name("DiskOnSystem"))
            .as_association()
            .with_feature(reference_feature("Antecedent", "System"))
            .with_feature(reference_feature("Dependent", "Disk"));
        let entries = class_association_entries(&class);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| {
            e.from_role == name("Antecedent") && e.to_role == name("Dependent")
        }));
        assert!(entries.iter().any(|e| {
            e.from_role == name("Dependent") && e.to_role == name("Antecedent")
        }));
    }

    #[test]
    fn ternary_association_yields_six_instance_entries() {
        let assoc_path = instance_path("Triple", 1);
        let mut inst = Instance::new(name("Triple"));
        for (i, role) in ["A", "B", "C"].iter().enumerate() {
            inst.set_property(
                name(role),
                Value::Reference(instance_path("Thing", i as i64)),
            );
        }
        let entries = instance_association_entries(&assoc_path, &inst);
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn non_reference_properties_are_ignored() {
        let assoc_path = instance_path("Link", 1);
        let inst = Instance::new(name("Link"))
            .with_property(name("From"), Value::Reference(instance_path("Thing", 1)))
            .with_property(name("To"), Value::Reference(instance_path("Thing", 2)))
            .with_property(name("Weight"), Value::Uint32(5));
        let entries = instance_association_entries(&assoc_path, &inst);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.assoc_class == name("Link")));
    }
}
