//! Deriving a caller's requested view from the canonical cached shape.
//!
//! The class cache holds exactly one shape per class: the fully resolved
//! form (all inherited features, all qualifiers, class origins set). Every
//! narrower view is computed from it without another store round trip.

use cimrepo_types::{CimName, Feature, ResolvedClass};

use crate::error::{RepositoryError, RepositoryResult};

/// The view a caller requested of a class.
#[derive(Clone, Debug)]
pub struct ClassView {
    /// Drop features inherited unchanged from ancestors.
    pub local_only: bool,
    pub include_qualifiers: bool,
    pub include_class_origin: bool,
    pub property_list: Option<Vec<CimName>>,
}

impl Default for ClassView {
    fn default() -> Self {
        Self {
            local_only: false,
            include_qualifiers: true,
            include_class_origin: true,
            property_list: None,
        }
    }
}

/// Reject property lists with duplicate (case-insensitive) names.
pub fn validate_property_list(list: Option<&[CimName]>) -> RepositoryResult<()> {
    let Some(list) = list else { return Ok(()) };
    for (i, name) in list.iter().enumerate() {
        if list[..i].contains(name) {
            return Err(RepositoryError::InvalidParameter(format!(
                "duplicate property list entry: {name}"
            )));
        }
    }
    Ok(())
}

/// Narrow the canonical resolved class down to `view`.
pub fn derive_class_view(mut class: ResolvedClass, view: &ClassView) -> ResolvedClass {
    if view.local_only {
        class.features.retain(|f| !f.propagated);
    }
    if let Some(wanted) = &view.property_list {
        class.features.retain(|f| wanted.contains(f.feature.name()));
    }
    if !view.include_class_origin {
        for feature in &mut class.features {
            feature.class_origin = None;
        }
    }
    if !view.include_qualifiers {
        class.qualifiers.clear();
        for resolved in &mut class.features {
            resolved.feature.set_qualifiers(Vec::new());
            if let Feature::Method(method) = &mut resolved.feature {
                for parameter in &mut method.parameters {
                    parameter.qualifiers.clear();
                }
            }
        }
    }
    class
}
