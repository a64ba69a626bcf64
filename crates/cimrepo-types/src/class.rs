use serde::{Deserialize, Serialize};

use crate::name::CimName;
use crate::qualifier::Qualifier;
use crate::value::{CimType, Value};

/// A method parameter: property- or reference-shaped, with its own
/// qualifier set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: CimName,
    pub kind: ParameterKind,
    /// `None` means scalar.
    pub array_size: Option<u32>,
    pub qualifiers: Vec<Qualifier>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterKind {
    Value(CimType),
    Reference { ref_class: CimName },
}

/// A property feature: a typed, optionally defaulted data slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: CimName,
    pub cim_type: CimType,
    pub value: Option<Value>,
    pub array_size: Option<u32>,
    pub qualifiers: Vec<Qualifier>,
}

/// A reference feature: a typed link to instances of another class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: CimName,
    pub ref_class: CimName,
    pub array_size: Option<u32>,
    pub qualifiers: Vec<Qualifier>,
}

/// A method feature with a return type and parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: CimName,
    pub return_type: CimType,
    pub parameters: Vec<Parameter>,
    pub qualifiers: Vec<Qualifier>,
}

/// One declared feature of a class: property, reference, or method.
/// Identity is the case-insensitive name, shared across all three kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Feature {
    Property(Property),
    Reference(Reference),
    Method(Method),
}

impl Feature {
    pub fn name(&self) -> &CimName {
        match self {
            Feature::Property(p) => &p.name,
            Feature::Reference(r) => &r.name,
            Feature::Method(m) => &m.name,
        }
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        match self {
            Feature::Property(p) => &p.qualifiers,
            Feature::Reference(r) => &r.qualifiers,
            Feature::Method(m) => &m.qualifiers,
        }
    }

    pub fn set_qualifiers(&mut self, qualifiers: Vec<Qualifier>) {
        match self {
            Feature::Property(p) => p.qualifiers = qualifiers,
            Feature::Reference(r) => r.qualifiers = qualifiers,
            Feature::Method(m) => m.qualifiers = qualifiers,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Feature::Reference(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Feature::Method(_))
    }

    /// Return the qualifier with the given name, if attached.
    pub fn qualifier(&self, name: &str) -> Option<&Qualifier> {
        self.qualifiers().iter().find(|q| q.name.matches(name))
    }
}

/// A class definition as written: its own qualifiers and features only,
/// with inherited content reachable through `super_class`.
///
/// Single inheritance: class graphs form a forest in a valid store. Cycles
/// are a store-corruption condition surfaced by the repository core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: CimName,
    pub super_class: Option<CimName>,
    pub qualifiers: Vec<Qualifier>,
    pub features: Vec<Feature>,
    /// Association-shaped classes participate in the association index.
    pub is_association: bool,
}

impl ClassDefinition {
    pub fn new(name: CimName) -> Self {
        Self {
            name,
            super_class: None,
            qualifiers: Vec::new(),
            features: Vec::new(),
            is_association: false,
        }
    }

    pub fn with_super_class(mut self, super_class: CimName) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn as_association(mut self) -> Self {
        self.is_association = true;
        self
    }

    pub fn find_feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name().matches(name))
    }
}

/// A feature in a resolved class, annotated with its defining class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFeature {
    pub feature: Feature,
    /// The class in the inheritance chain that defines the visible version.
    /// `None` when the caller asked for the origin to be omitted.
    pub class_origin: Option<CimName>,
    /// `true` when inherited unchanged in name from an ancestor.
    pub propagated: bool,
}

/// The fully merged view of a class: for every feature name reachable from
/// the class or any ancestor, exactly one feature. This is the unit the
/// repository caches and returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedClass {
    pub name: CimName,
    pub super_class: Option<CimName>,
    pub qualifiers: Vec<Qualifier>,
    pub features: Vec<ResolvedFeature>,
    pub is_association: bool,
}

impl ResolvedClass {
    pub fn find_feature(&self, name: &str) -> Option<&ResolvedFeature> {
        self.features.iter().find(|f| f.feature.name().matches(name))
    }

    pub fn qualifier(&self, name: &str) -> Option<&Qualifier> {
        self.qualifiers.iter().find(|q| q.name.matches(name))
    }

    /// Names of properties carrying a true-valued `Key` qualifier, in
    /// declaration order. These form the instance identity.
    pub fn key_property_names(&self) -> Vec<CimName> {
        self.features
            .iter()
            .filter(|rf| !rf.feature.is_method())
            .filter(|rf| rf.feature.qualifier("Key").is_some_and(|q| q.value.is_true()))
            .map(|rf| rf.feature.name().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualifier::Qualifier;

    fn name(s: &str) -> CimName {
        CimName::new(s).unwrap()
    }

    fn key_property(n: &str, ty: CimType) -> Feature {
        Feature::Property(Property {
            name: name(n),
            cim_type: ty,
            value: None,
            array_size: None,
            qualifiers: vec![Qualifier::flag("Key").unwrap()],
        })
    }

    #[test]
    fn feature_lookup_is_case_insensitive() {
        let class = ClassDefinition::new(name("Disk"))
            .with_feature(key_property("DeviceID", CimType::String));
        assert!(class.find_feature("deviceid").is_some());
        assert!(class.find_feature("nosuch").is_none());
    }

    #[test]
    fn key_property_names_from_resolved_class() {
        let resolved = ResolvedClass {
            name: name("Disk"),
            super_class: None,
            qualifiers: vec![],
            features: vec![
                ResolvedFeature {
                    feature: key_property("DeviceID", CimType::String),
                    class_origin: Some(name("Disk")),
                    propagated: false,
                },
                ResolvedFeature {
                    feature: Feature::Property(Property {
                        name: name("SizeBytes"),
                        cim_type: CimType::Uint64,
                        value: None,
                        array_size: None,
                        qualifiers: vec![],
                    }),
                    class_origin: Some(name("Disk")),
                    propagated: false,
                },
            ],
            is_association: false,
        };
        assert_eq!(resolved.key_property_names(), vec![name("DeviceID")]);
    }

    #[test]
    fn method_features_never_contribute_keys() {
        let resolved = ResolvedClass {
            name: name("Disk"),
            super_class: None,
            qualifiers: vec![],
            features: vec![ResolvedFeature {
                feature: Feature::Method(Method {
                    name: name("Reset"),
                    return_type: CimType::Uint32,
                    parameters: vec![],
                    qualifiers: vec![Qualifier::flag("Key").unwrap()],
                }),
                class_origin: Some(name("Disk")),
                propagated: false,
            }],
            is_association: false,
        };
        assert!(resolved.key_property_names().is_empty());
    }
}
