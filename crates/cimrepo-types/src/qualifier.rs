use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::name::CimName;
use crate::value::{CimType, Value};

bitflags! {
    /// Propagation behavior of a qualifier.
    ///
    /// `TOSUBCLASS` qualifiers are inherited by subclasses; `RESTRICTED`
    /// qualifiers are confined to the declaring class and excluded from
    /// every subclass's merged view. `OVERRIDABLE` permits a subclass to
    /// change the value; `DISABLEOVERRIDE` forbids it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct QualifierFlavor: u8 {
        const OVERRIDABLE     = 0x01;
        const TOSUBCLASS      = 0x02;
        const TRANSLATABLE    = 0x04;
        const DISABLEOVERRIDE = 0x08;
        const RESTRICTED      = 0x10;
    }
}

impl QualifierFlavor {
    /// The default flavor: overridable and propagated to subclasses.
    pub fn defaults() -> Self {
        Self::OVERRIDABLE | Self::TOSUBCLASS
    }

    /// Reject contradictory combinations.
    pub fn validate(self) -> Result<(), TypeError> {
        if self.contains(Self::OVERRIDABLE) && self.contains(Self::DISABLEOVERRIDE) {
            return Err(TypeError::InvalidFlavor(
                "OVERRIDABLE conflicts with DISABLEOVERRIDE".into(),
            ));
        }
        if self.contains(Self::TOSUBCLASS) && self.contains(Self::RESTRICTED) {
            return Err(TypeError::InvalidFlavor(
                "TOSUBCLASS conflicts with RESTRICTED".into(),
            ));
        }
        Ok(())
    }
}

impl Default for QualifierFlavor {
    fn default() -> Self {
        Self::defaults()
    }
}

bitflags! {
    /// The kinds of schema element a qualifier may be attached to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct QualifierScope: u8 {
        const CLASS       = 0x01;
        const ASSOCIATION = 0x02;
        const PROPERTY    = 0x04;
        const REFERENCE   = 0x08;
        const METHOD      = 0x10;
        const PARAMETER   = 0x20;
        const ANY         = 0x3f;
    }
}

/// A qualifier declaration: the namespace-level definition of a qualifier's
/// type, default value, scope, and flavor.
///
/// Immutable once in use except through the explicit set/delete qualifier
/// operations. Identity is the case-insensitive name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualifierDeclaration {
    pub name: CimName,
    pub cim_type: CimType,
    /// Default value attached where a class names the qualifier without one.
    pub default_value: Option<Value>,
    /// `None` means scalar (no array subscript).
    pub array_size: Option<u32>,
    pub scope: QualifierScope,
    pub flavor: QualifierFlavor,
}

impl QualifierDeclaration {
    /// A scalar declaration with default scope `ANY` and default flavor.
    pub fn new(name: CimName, cim_type: CimType) -> Self {
        Self {
            name,
            cim_type,
            default_value: None,
            array_size: None,
            scope: QualifierScope::ANY,
            flavor: QualifierFlavor::defaults(),
        }
    }

    pub fn with_flavor(mut self, flavor: QualifierFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_scope(mut self, scope: QualifierScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A qualifier attachment: a (name, value) pair on a class, feature, or
/// parameter. The declaration carrying the flavor lives at namespace level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Qualifier {
    pub name: CimName,
    pub value: Value,
}

impl Qualifier {
    pub fn new(name: CimName, value: Value) -> Self {
        Self { name, value }
    }

    /// Convenience constructor for flag qualifiers like `Key` or
    /// `Association`.
    pub fn flag(name: &str) -> Result<Self, TypeError> {
        Ok(Self::new(CimName::new(name)?, Value::Boolean(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flavor_is_overridable_tosubclass() {
        let f = QualifierFlavor::defaults();
        assert!(f.contains(QualifierFlavor::OVERRIDABLE));
        assert!(f.contains(QualifierFlavor::TOSUBCLASS));
        assert!(!f.contains(QualifierFlavor::RESTRICTED));
    }

    #[test]
    fn contradictory_flavors_rejected() {
        let f = QualifierFlavor::OVERRIDABLE | QualifierFlavor::DISABLEOVERRIDE;
        assert!(f.validate().is_err());
        let f = QualifierFlavor::TOSUBCLASS | QualifierFlavor::RESTRICTED;
        assert!(f.validate().is_err());
        assert!(QualifierFlavor::RESTRICTED.validate().is_ok());
        assert!(QualifierFlavor::defaults().validate().is_ok());
    }

    #[test]
    fn builder_style_declaration() {
        let decl = QualifierDeclaration::new(
            CimName::new("Key").unwrap(),
            CimType::Boolean,
        )
        .with_scope(QualifierScope::PROPERTY | QualifierScope::REFERENCE)
        .with_flavor(QualifierFlavor::DISABLEOVERRIDE | QualifierFlavor::TOSUBCLASS)
        .with_default(Value::Boolean(false));

        assert!(decl.scope.contains(QualifierScope::PROPERTY));
        assert!(!decl.scope.contains(QualifierScope::METHOD));
        assert_eq!(decl.default_value, Some(Value::Boolean(false)));
    }

    #[test]
    fn flag_qualifier() {
        let q = Qualifier::flag("Key").unwrap();
        assert!(q.value.is_true());
        assert!(q.name.matches("KEY"));
    }
}
