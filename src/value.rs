//! Runtime values and the render context.
//!
//! Interpolation slots, metadata fields and attribute mappings all share
//! one value model. Mappings are insertion-ordered: attribute order and
//! metadata field order are observable in the rendered document.

use indexmap::IndexMap;
use serde::Deserialize;

/// An insertion-ordered string-keyed mapping.
pub type Mapping = IndexMap<String, Value>;

/// A runtime value.
///
/// Deserializes untagged, so a YAML metadata header maps onto it directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// Render the value for content interpolation.
    ///
    /// Sequences join their items with commas (default string
    /// conversion); mappings render as their JSON form.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => fmt_number(*n),
            Self::String(s) => s.clone(),
            Self::Sequence(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
            Self::Mapping(_) => self.to_json().to_string(),
        }
    }

    /// Convert to a JSON value. Integral numbers become JSON integers so
    /// attribute serialization emits `n=5`, not `n=5.0`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => {
                if is_integral(*n) {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Value::from(*n)
                }
            }
            Self::String(s) => serde_json::Value::from(s.as_str()),
            Self::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Borrow the mapping contents, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

/// True when `n` prints without a fractional part.
fn is_integral(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15
}

/// Format a number the way document text expects: `5`, not `5.0`.
fn fmt_number(n: f64) -> String {
    if is_integral(n) {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Self::Mapping(map)
    }
}

// ============================================================================
// Render context
// ============================================================================

/// The caller-supplied context for one artifact invocation.
///
/// At invocation time the artifact merges these entries over its bound
/// metadata; context fields win on key collision.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: Mapping,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a context field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Mapping> for Context {
    fn from(entries: Mapping) -> Self {
        Self { entries }
    }
}
