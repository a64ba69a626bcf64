use std::fmt;

use serde::{Deserialize, Serialize};

/// CIM data types carried by properties, parameters, and qualifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CimType {
    Boolean,
    Uint32,
    Sint32,
    Uint64,
    Sint64,
    Real64,
    String,
    DateTime,
    Reference,
}

/// A typed CIM value.
///
/// `Array` holds homogeneous elements; the element type is the type of the
/// declaring feature. Scalar features have `array_size == None` in their
/// declarations (no array subscript).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Uint32(u32),
    Sint32(i32),
    Uint64(u64),
    Sint64(i64),
    Real64(f64),
    String(String),
    DateTime(String),
    Reference(crate::path::ObjectPath),
    Array(Vec<Value>),
}

impl Value {
    /// The CIM type of this value, or `None` for an empty array (whose
    /// element type is unknowable from the value alone).
    pub fn cim_type(&self) -> Option<CimType> {
        match self {
            Value::Boolean(_) => Some(CimType::Boolean),
            Value::Uint32(_) => Some(CimType::Uint32),
            Value::Sint32(_) => Some(CimType::Sint32),
            Value::Uint64(_) => Some(CimType::Uint64),
            Value::Sint64(_) => Some(CimType::Sint64),
            Value::Real64(_) => Some(CimType::Real64),
            Value::String(_) => Some(CimType::String),
            Value::DateTime(_) => Some(CimType::DateTime),
            Value::Reference(_) => Some(CimType::Reference),
            Value::Array(elems) => elems.first().and_then(Value::cim_type),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// `true` for `Boolean(true)`; used for flag-style qualifiers like `Key`.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Sint32(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::Sint64(v) => write!(f, "{v}"),
            Value::Real64(v) => write!(f, "{v}"),
            Value::String(s) | Value::DateTime(s) => f.write_str(s),
            Value::Reference(p) => write!(f, "{p}"),
            Value::Array(elems) => {
                f.write_str("{")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str("}")
            }
        }
    }
}
