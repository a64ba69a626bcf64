use serde::{Deserialize, Serialize};

use crate::name::CimName;
use crate::value::Value;

/// An instance of a class: the class name plus an ordered property
/// name→value map with case-insensitive keys.
///
/// The instance's identity (its object path) is derived by the repository
/// from the class's key properties; an instance value does not carry its
/// own path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub class_name: CimName,
    properties: Vec<(CimName, Value)>,
}

impl Instance {
    pub fn new(class_name: CimName) -> Self {
        Self {
            class_name,
            properties: Vec::new(),
        }
    }

    /// Set a property value, replacing any existing value under the same
    /// case-insensitive name (the original spelling of the first set wins).
    pub fn set_property(&mut self, name: CimName, value: Value) {
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.properties.push((name, value)),
        }
    }

    /// Builder-style variant of [`set_property`](Self::set_property).
    pub fn with_property(mut self, name: CimName, value: Value) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| n.matches(name))
            .map(|(_, v)| v)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&CimName, &Value)> {
        self.properties.iter().map(|(n, v)| (n, v))
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Drop every property whose name is not in `keep`.
    pub fn retain_properties(&mut self, keep: &[CimName]) {
        self.properties.retain(|(n, _)| keep.contains(n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> CimName {
        CimName::new(s).unwrap()
    }

    #[test]
    fn set_replaces_case_insensitively() {
        let mut inst = Instance::new(name("Disk"));
        inst.set_property(name("DeviceID"), Value::String("a".into()));
        inst.set_property(name("DEVICEID"), Value::String("b".into()));
        assert_eq!(inst.property_count(), 1);
        assert_eq!(inst.property("deviceid"), Some(&Value::String("b".into())));
    }

    #[test]
    fn retain_filters_properties() {
        let mut inst = Instance::new(name("Disk"))
            .with_property(name("A"), Value::Uint32(1))
            .with_property(name("B"), Value::Uint32(2))
            .with_property(name("C"), Value::Uint32(3));
        inst.retain_properties(&[name("a"), name("C")]);
        assert_eq!(inst.property_count(), 2);
        assert!(inst.property("B").is_none());
    }

    #[test]
    fn insertion_order_preserved() {
        let inst = Instance::new(name("Disk"))
            .with_property(name("Z"), Value::Uint32(1))
            .with_property(name("A"), Value::Uint32(2));
        let names: Vec<&str> = inst.properties().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Z", "A"]);
    }
}
