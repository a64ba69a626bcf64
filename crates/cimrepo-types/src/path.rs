use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::name::{CimName, NamespaceName};

/// A key-binding value. Only these four shapes may appear in keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum KeyValue {
    Boolean(bool),
    Number(i64),
    String(String),
    Reference(Box<ObjectPath>),
}

/// One `name=value` binding in an object path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub name: CimName,
    pub value: KeyValue,
}

impl KeyBinding {
    pub fn new(name: CimName, value: KeyValue) -> Self {
        Self { name, value }
    }
}

/// Normalized identifier for an instance (or a keyless class path).
///
/// Textual form: `namespace:ClassName.Key1=Value1,Key2=Value2`, with
/// reference-valued keys nesting recursively inside `R"..."`. Two paths are
/// equal when their canonical forms are equal: namespace, class, and key
/// names are case-folded and key bindings are ordered lexicographically by
/// folded key name. String key values keep their case.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectPath {
    pub namespace: Option<NamespaceName>,
    pub class_name: CimName,
    pub key_bindings: Vec<KeyBinding>,
}

impl ObjectPath {
    /// A keyless path (names a class rather than an instance).
    pub fn class(class_name: CimName) -> Self {
        Self {
            namespace: None,
            class_name,
            key_bindings: Vec::new(),
        }
    }

    pub fn new(class_name: CimName, key_bindings: Vec<KeyBinding>) -> Self {
        Self {
            namespace: None,
            class_name,
            key_bindings,
        }
    }

    pub fn with_namespace(mut self, namespace: NamespaceName) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Drop the namespace component when it matches `namespace`.
    ///
    /// Intra-namespace references are stored namespace-free so that
    /// textually different spellings of the same object compare equal.
    pub fn strip_namespace(&mut self, namespace: &NamespaceName) {
        if self.namespace.as_ref() == Some(namespace) {
            self.namespace = None;
        }
    }

    pub fn key(&self, name: &str) -> Option<&KeyValue> {
        self.key_bindings
            .iter()
            .find(|kb| kb.name.matches(name))
            .map(|kb| &kb.value)
    }

    /// The canonical string form: case-folded namespace/class/key names,
    /// bindings sorted by folded key name. This is the cache key.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        if let Some(ns) = &self.namespace {
            out.push_str(&ns.folded());
            out.push(':');
        }
        out.push_str(&self.class_name.folded());
        let mut sorted: Vec<&KeyBinding> = self.key_bindings.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        for (i, kb) in sorted.iter().enumerate() {
            out.push(if i == 0 { '.' } else { ',' });
            out.push_str(&kb.name.folded());
            out.push('=');
            write_key_value(&mut out, &kb.value, true);
        }
        out
    }

    /// Parse the textual form back into a path.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let mut parser = PathParser::new(s);
        let path = parser.parse_path()?;
        if !parser.at_end() {
            return Err(parser.error("trailing characters"));
        }
        Ok(path)
    }
}

impl PartialEq for ObjectPath {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for ObjectPath {}

impl Hash for ObjectPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

fn write_key_value(out: &mut String, value: &KeyValue, canonical: bool) {
    match value {
        KeyValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        KeyValue::Number(n) => out.push_str(&n.to_string()),
        KeyValue::String(s) => {
            out.push('"');
            push_escaped(out, s);
            out.push('"');
        }
        KeyValue::Reference(path) => {
            out.push_str("R\"");
            let inner = if canonical {
                path.canonical()
            } else {
                path.to_string()
            };
            push_escaped(out, &inner);
            out.push('"');
        }
    }
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if let Some(ns) = &self.namespace {
            out.push_str(ns.as_str());
            out.push(':');
        }
        out.push_str(self.class_name.as_str());
        for (i, kb) in self.key_bindings.iter().enumerate() {
            out.push(if i == 0 { '.' } else { ',' });
            out.push_str(kb.name.as_str());
            out.push('=');
            write_key_value(&mut out, &kb.value, false);
        }
        f.write_str(&out)
    }
}

impl FromStr for ObjectPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct PathParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, reason: &str) -> TypeError {
        TypeError::InvalidPath {
            path: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn parse_path(&mut self) -> Result<ObjectPath, TypeError> {
        // The prefix up to the first '.' (or end) is `[namespace:]Class`.
        // Namespace segments and class names cannot contain '.', '=', or '"'.
        let head_start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'.' {
                break;
            }
            self.pos += 1;
        }
        let head = &self.input[head_start..self.pos];
        let (namespace, class_str) = match head.rsplit_once(':') {
            Some((ns, class)) => (Some(NamespaceName::new(ns)?), class),
            None => (None, head),
        };
        let class_name = CimName::new(class_str)?;

        let mut key_bindings = Vec::new();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            loop {
                key_bindings.push(self.parse_binding()?);
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    _ => break,
                }
            }
        }

        Ok(ObjectPath {
            namespace,
            class_name,
            key_bindings,
        })
    }

    fn parse_binding(&mut self) -> Result<KeyBinding, TypeError> {
        let name_start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'=' {
                break;
            }
            self.pos += 1;
        }
        if self.peek() != Some(b'=') {
            return Err(self.error("expected '=' in key binding"));
        }
        let name = CimName::new(&self.input[name_start..self.pos])?;
        self.pos += 1;
        let value = self.parse_value()?;
        Ok(KeyBinding::new(name, value))
    }

    fn parse_value(&mut self) -> Result<KeyValue, TypeError> {
        match self.peek() {
            Some(b'"') => {
                self.pos += 1;
                Ok(KeyValue::String(self.parse_quoted()?))
            }
            Some(b'R') if self.bytes.get(self.pos + 1) == Some(&b'"') => {
                self.pos += 2;
                let inner = self.parse_quoted()?;
                let path = ObjectPath::parse(&inner)?;
                Ok(KeyValue::Reference(Box::new(path)))
            }
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b == b',' {
                        break;
                    }
                    self.pos += 1;
                }
                let raw = &self.input[start..self.pos];
                if raw.eq_ignore_ascii_case("true") {
                    Ok(KeyValue::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(KeyValue::Boolean(false))
                } else {
                    raw.parse::<i64>()
                        .map(KeyValue::Number)
                        .map_err(|_| self.error("expected number, boolean, or quoted value"))
                }
            }
            None => Err(self.error("expected key value")),
        }
    }

    /// Consume an escape-aware quoted body; the opening quote is already
    /// consumed.
    fn parse_quoted(&mut self) -> Result<String, TypeError> {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some(b'\\') => match self.bytes.get(self.pos + 1).copied() {
                    Some(c) if c == b'"' || c == b'\\' => {
                        out.push(c as char);
                        self.pos += 2;
                    }
                    _ => return Err(self.error("bad escape")),
                },
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(_) => {
                    let c = self.input[self.pos..]
                        .chars()
                        .next()
                        .ok_or_else(|| self.error("bad utf-8 boundary"))?;
                    out.push(c);
                    self.pos += c.len_utf8();
                }
                None => return Err(self.error("unterminated quoted value")),
            }
        }
    }
}
