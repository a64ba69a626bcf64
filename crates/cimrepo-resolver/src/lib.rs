//! Pure class resolution: merging a class's own features and qualifiers
//! with those inherited from its ancestor chain.
//!
//! Nothing here performs I/O or blocks. The caller materializes the
//! inheritance chain (leaf first, root last) and guards it against cycles;
//! this crate folds the chain into one [`ResolvedClass`].
//!
//! The merge rules:
//!
//! - Ancestor features come first. A feature redeclared by a nearer class
//!   replaces the inherited one **in place** (keeping its position) and is
//!   marked non-propagated with the redeclaring class as its origin.
//! - Qualifiers merge root-down per target (whole class, one feature, or
//!   one method parameter). A nearer declaration overrides an inherited
//!   value; a qualifier first introduced by an ancestor is added to the
//!   merged set only if its declared flavor is not `RESTRICTED`, which
//!   confines `RESTRICTED` qualifiers to the class that declares them.
//! - Result sizes are bounded by [`ResolveLimits`]; exceeding a bound is
//!   an overflow error, never silent truncation.

use std::collections::HashMap;

use cimrepo_types::{
    CimName, ClassDefinition, Feature, Qualifier, QualifierDeclaration, QualifierFlavor,
    ResolvedClass, ResolvedFeature,
};

/// Bounded result capacities, kept for compatibility with fixed-table
/// deployments. The merge itself uses growable sequences.
#[derive(Clone, Copy, Debug)]
pub struct ResolveLimits {
    pub max_features: usize,
    pub max_qualifiers: usize,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self {
            max_features: 512,
            max_qualifiers: 128,
        }
    }
}

/// Errors from class resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The merged feature set exceeded the configured capacity.
    #[error("feature table overflow in class {class} (limit {limit})")]
    FeatureOverflow { class: CimName, limit: usize },

    /// The merged qualifier set exceeded the configured capacity.
    #[error("qualifier table overflow in class {class} (limit {limit})")]
    QualifierOverflow { class: CimName, limit: usize },
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// View switches for [`make_resolved_class`].
#[derive(Clone, Debug)]
pub struct ResolveOptions<'a> {
    /// Only features declared directly on the class itself.
    pub local_only: bool,
    pub include_qualifiers: bool,
    pub include_class_origin: bool,
    /// Restrict the resulting features to this name subset.
    pub property_list: Option<&'a [CimName]>,
}

impl ResolveOptions<'_> {
    /// The canonical shape the repository caches: everything included,
    /// nothing filtered.
    pub fn canonical() -> Self {
        Self {
            local_only: false,
            include_qualifiers: true,
            include_class_origin: true,
            property_list: None,
        }
    }
}

/// A merged feature together with the class that defines its visible
/// version.
#[derive(Clone, Debug)]
pub struct MergedFeature<'a> {
    pub feature: &'a Feature,
    pub origin: &'a CimName,
}

/// Merge the features of `chain` (leaf first, root last) into one ordered
/// sequence with exactly one entry per case-insensitive feature name.
pub fn merge_features<'a>(
    chain: &[&'a ClassDefinition],
    local_only: bool,
    limits: ResolveLimits,
) -> ResolveResult<Vec<MergedFeature<'a>>> {
    let mut merged: Vec<MergedFeature<'a>> = Vec::new();
    let classes: Vec<&ClassDefinition> = if local_only {
        chain.first().copied().into_iter().collect()
    } else {
        chain.iter().rev().copied().collect()
    };

    for class in classes {
        for feature in &class.features {
            match merged
                .iter_mut()
                .find(|m| m.feature.name() == feature.name())
            {
                // Redeclaration overrides in place, keeping the inherited
                // position.
                Some(slot) => {
                    slot.feature = feature;
                    slot.origin = &class.name;
                }
                None => {
                    if merged.len() == limits.max_features {
                        return Err(ResolveError::FeatureOverflow {
                            class: leaf_name(chain),
                            limit: limits.max_features,
                        });
                    }
                    merged.push(MergedFeature {
                        feature,
                        origin: &class.name,
                    });
                }
            }
        }
    }
    Ok(merged)
}

/// The qualifier target within a class: the class itself, one feature, or
/// one parameter of one method.
#[derive(Clone, Copy, Debug)]
pub enum QualifierTarget<'a> {
    Class,
    Feature(&'a CimName),
    Parameter {
        method: &'a CimName,
        parameter: &'a CimName,
    },
}

/// Merge the qualifiers attached to `target` across the chain.
///
/// The chain is walked root-down; the leaf is depth 0. An inherited
/// qualifier is overridden by a nearer declaration; a qualifier introduced
/// above depth 0 joins the merged set only if its declared flavor is not
/// `RESTRICTED`. Unknown qualifier names resolve with the default flavor.
pub fn merge_qualifiers(
    chain: &[&ClassDefinition],
    declarations: &HashMap<CimName, QualifierDeclaration>,
    target: QualifierTarget<'_>,
    limits: ResolveLimits,
) -> ResolveResult<Vec<Qualifier>> {
    let mut merged: Vec<Qualifier> = Vec::new();

    // Root first: the chain index is the depth of the class at it.
    for (depth, class) in chain.iter().enumerate().rev() {
        let Some(qualifiers) = target_qualifiers(class, target) else {
            continue;
        };
        for qualifier in qualifiers {
            match merged.iter_mut().find(|q| q.name == qualifier.name) {
                Some(existing) => {
                    existing.value = qualifier.value.clone();
                }
                None => {
                    let flavor = declarations
                        .get(&qualifier.name)
                        .map(|d| d.flavor)
                        .unwrap_or_default();
                    if depth == 0 || !flavor.contains(QualifierFlavor::RESTRICTED) {
                        if merged.len() == limits.max_qualifiers {
                            return Err(ResolveError::QualifierOverflow {
                                class: leaf_name(chain),
                                limit: limits.max_qualifiers,
                            });
                        }
                        merged.push(qualifier.clone());
                    }
                }
            }
        }
    }
    Ok(merged)
}

fn target_qualifiers<'a>(
    class: &'a ClassDefinition,
    target: QualifierTarget<'_>,
) -> Option<&'a [Qualifier]> {
    match target {
        QualifierTarget::Class => Some(&class.qualifiers),
        QualifierTarget::Feature(name) => {
            class.find_feature(name.as_str()).map(Feature::qualifiers)
        }
        QualifierTarget::Parameter { method, parameter } => {
            match class.find_feature(method.as_str())? {
                Feature::Method(m) => m
                    .parameters
                    .iter()
                    .find(|p| p.name == *parameter)
                    .map(|p| p.qualifiers.as_slice()),
                _ => None,
            }
        }
    }
}

fn leaf_name(chain: &[&ClassDefinition]) -> CimName {
    chain
        .first()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| CimName::new("unknown").expect("static name is valid"))
}

/// Build the resolved view of the chain's leaf class.
///
/// The qualifier merge always walks the full chain (the `RESTRICTED` gate
/// needs the depth); `local_only` narrows only the feature set.
pub fn make_resolved_class(
    chain: &[&ClassDefinition],
    declarations: &HashMap<CimName, QualifierDeclaration>,
    options: &ResolveOptions<'_>,
    limits: ResolveLimits,
) -> ResolveResult<ResolvedClass> {
    let leaf = chain.first().expect("chain contains at least the class itself");
    let merged = merge_features(chain, options.local_only, limits)?;

    let mut features = Vec::with_capacity(merged.len());
    for m in merged {
        if let Some(wanted) = options.property_list {
            if !wanted.contains(m.feature.name()) {
                continue;
            }
        }

        let mut feature = m.feature.clone();
        if options.include_qualifiers {
            feature.set_qualifiers(merge_qualifiers(
                chain,
                declarations,
                QualifierTarget::Feature(m.feature.name()),
                limits,
            )?);
            if let Feature::Method(method) = &mut feature {
                let method_name = method.name.clone();
                for parameter in &mut method.parameters {
                    parameter.qualifiers = merge_qualifiers(
                        chain,
                        declarations,
                        QualifierTarget::Parameter {
                            method: &method_name,
                            parameter: &parameter.name,
                        },
                        limits,
                    )?;
                }
            }
        } else {
            feature.set_qualifiers(Vec::new());
            if let Feature::Method(method) = &mut feature {
                for parameter in &mut method.parameters {
                    parameter.qualifiers.clear();
                }
            }
        }

        features.push(ResolvedFeature {
            feature,
            class_origin: options.include_class_origin.then(|| m.origin.clone()),
            propagated: m.origin != &leaf.name,
        });
    }

    let qualifiers = if options.include_qualifiers {
        merge_qualifiers(chain, declarations, QualifierTarget::Class, limits)?
    } else {
        Vec::new()
    };

    Ok(ResolvedClass {
        name: leaf.name.clone(),
        super_class: leaf.super_class.clone(),
        qualifiers,
        features,
        is_association: leaf.is_association,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cimrepo_types::{CimType, Method, Parameter, ParameterKind, Property, Value};

    fn name(s: &str) -> CimName {
        CimName::new(s).unwrap()
    }

    fn property(n: &str, qualifiers: Vec<Qualifier>) -> Feature {
        Feature::Property(Property {
            name: name(n),
            cim_type: CimType::String,
            value: None,
            array_size: None,
            qualifiers,
        })
    }

    fn qualifier(n: &str, v: &str) -> Qualifier {
        Qualifier::new(name(n), Value::String(v.into()))
    }

    fn declarations(decls: Vec<QualifierDeclaration>) -> HashMap<CimName, QualifierDeclaration> {
        decls.into_iter().map(|d| (d.name.clone(), d)).collect()
    }

    fn restricted_decl(n: &str) -> QualifierDeclaration {
        QualifierDeclaration::new(name(n), CimType::String)
            .with_flavor(QualifierFlavor::OVERRIDABLE | QualifierFlavor::RESTRICTED)
    }

    /// base <- middle <- leaf, with an override of `Shared` in leaf.
    fn three_level_chain() -> (ClassDefinition, ClassDefinition, ClassDefinition) {
        let base = ClassDefinition::new(name("Base"))
            .with_feature(property("Shared", vec![qualifier("Doc", "base")]))
            .with_feature(property("BaseOnly", vec![]));
        let middle = ClassDefinition::new(name("Middle"))
            .with_super_class(name("Base"))
            .with_feature(property("MiddleOnly", vec![]));
        let leaf = ClassDefinition::new(name("Leaf"))
            .with_super_class(name("Middle"))
            .with_feature(property("Shared", vec![qualifier("Doc", "leaf")]))
            .with_feature(property("LeafOnly", vec![]));
        (base, middle, leaf)
    }

    #[test]
    fn features_merge_with_ancestors_first() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let merged = merge_features(&chain, false, ResolveLimits::default()).unwrap();
        let names: Vec<&str> = merged.iter().map(|m| m.feature.name().as_str()).collect();
        // Ancestor order kept; the override stays in the inherited position.
        assert_eq!(names, ["Shared", "BaseOnly", "MiddleOnly", "LeafOnly"]);
    }

    #[test]
    fn each_name_appears_exactly_once() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let merged = merge_features(&chain, false, ResolveLimits::default()).unwrap();
        let shared: Vec<_> = merged
            .iter()
            .filter(|m| m.feature.name().matches("shared"))
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(*shared[0].origin, name("Leaf"));
    }

    #[test]
    fn local_only_takes_leaf_features() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let merged = merge_features(&chain, true, ResolveLimits::default()).unwrap();
        let names: Vec<&str> = merged.iter().map(|m| m.feature.name().as_str()).collect();
        assert_eq!(names, ["Shared", "LeafOnly"]);
    }

    #[test]
    fn feature_overflow_is_reported() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let limits = ResolveLimits {
            max_features: 2,
            max_qualifiers: 128,
        };
        assert!(matches!(
            merge_features(&chain, false, limits),
            Err(ResolveError::FeatureOverflow { limit: 2, .. })
        ));
    }

    #[test]
    fn subclass_overrides_qualifier_value() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let merged = merge_qualifiers(
            &chain,
            &declarations(vec![]),
            QualifierTarget::Feature(&name("Shared")),
            ResolveLimits::default(),
        )
        .unwrap();
        assert_eq!(merged, vec![qualifier("Doc", "leaf")]);
    }

    #[test]
    fn restricted_qualifier_confined_to_declaring_class() {
        let base = ClassDefinition::new(name("A")).with_qualifier(qualifier("Secret", "v"));
        let sub = ClassDefinition::new(name("B")).with_super_class(name("A"));
        let decls = declarations(vec![restricted_decl("Secret")]);

        // Resolving A itself (depth 0) keeps the qualifier.
        let own = merge_qualifiers(
            &[&base],
            &decls,
            QualifierTarget::Class,
            ResolveLimits::default(),
        )
        .unwrap();
        assert_eq!(own.len(), 1);

        // Resolving subclass B drops it.
        let inherited = merge_qualifiers(
            &[&sub, &base],
            &decls,
            QualifierTarget::Class,
            ResolveLimits::default(),
        )
        .unwrap();
        assert!(inherited.is_empty());
    }

    #[test]
    fn non_restricted_qualifier_propagates() {
        let base = ClassDefinition::new(name("A")).with_qualifier(qualifier("Doc", "v"));
        let sub = ClassDefinition::new(name("B")).with_super_class(name("A"));
        let merged = merge_qualifiers(
            &[&sub, &base],
            &declarations(vec![]),
            QualifierTarget::Class,
            ResolveLimits::default(),
        )
        .unwrap();
        assert_eq!(merged, vec![qualifier("Doc", "v")]);
    }

    #[test]
    fn qualifier_overflow_is_reported() {
        let mut base = ClassDefinition::new(name("A"));
        for i in 0..5 {
            base = base.with_qualifier(qualifier(&format!("Q{i}"), "v"));
        }
        let limits = ResolveLimits {
            max_features: 512,
            max_qualifiers: 3,
        };
        assert!(matches!(
            merge_qualifiers(&[&base], &declarations(vec![]), QualifierTarget::Class, limits),
            Err(ResolveError::QualifierOverflow { limit: 3, .. })
        ));
    }

    #[test]
    fn resolved_class_annotates_origin_and_propagated() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let resolved = make_resolved_class(
            &chain,
            &declarations(vec![]),
            &ResolveOptions::canonical(),
            ResolveLimits::default(),
        )
        .unwrap();

        let base_only = resolved.find_feature("BaseOnly").unwrap();
        assert!(base_only.propagated);
        assert_eq!(base_only.class_origin, Some(name("Base")));

        let shared = resolved.find_feature("Shared").unwrap();
        assert!(!shared.propagated);
        assert_eq!(shared.class_origin, Some(name("Leaf")));
        // The override carries the leaf's qualifiers.
        assert_eq!(
            shared.feature.qualifiers(),
            &[qualifier("Doc", "leaf")][..]
        );
    }

    #[test]
    fn property_list_filters_features() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let wanted = [name("baseonly"), name("LeafOnly")];
        let options = ResolveOptions {
            property_list: Some(&wanted),
            ..ResolveOptions::canonical()
        };
        let resolved =
            make_resolved_class(&chain, &declarations(vec![]), &options, ResolveLimits::default())
                .unwrap();
        let names: Vec<&str> = resolved
            .features
            .iter()
            .map(|f| f.feature.name().as_str())
            .collect();
        assert_eq!(names, ["BaseOnly", "LeafOnly"]);
    }

    #[test]
    fn include_switches_strip_annotations() {
        let (base, middle, leaf) = three_level_chain();
        let chain = [&leaf, &middle, &base];
        let options = ResolveOptions {
            include_qualifiers: false,
            include_class_origin: false,
            ..ResolveOptions::canonical()
        };
        let resolved =
            make_resolved_class(&chain, &declarations(vec![]), &options, ResolveLimits::default())
                .unwrap();
        assert!(resolved.qualifiers.is_empty());
        for f in &resolved.features {
            assert!(f.class_origin.is_none());
            assert!(f.feature.qualifiers().is_empty());
        }
    }

    #[test]
    fn method_parameter_qualifiers_merge() {
        let base = ClassDefinition::new(name("A")).with_feature(Feature::Method(Method {
            name: name("Reset"),
            return_type: CimType::Uint32,
            parameters: vec![Parameter {
                name: name("Force"),
                kind: ParameterKind::Value(CimType::Boolean),
                array_size: None,
                qualifiers: vec![qualifier("Doc", "force flag")],
            }],
            qualifiers: vec![],
        }));
        let sub = ClassDefinition::new(name("B")).with_super_class(name("A"));
        let resolved = make_resolved_class(
            &[&sub, &base],
            &declarations(vec![]),
            &ResolveOptions::canonical(),
            ResolveLimits::default(),
        )
        .unwrap();
        let method = match &resolved.find_feature("Reset").unwrap().feature {
            Feature::Method(m) => m,
            other => panic!("expected method, got {other:?}"),
        };
        assert_eq!(
            method.parameters[0].qualifiers,
            vec![qualifier("Doc", "force flag")]
        );
    }
}
