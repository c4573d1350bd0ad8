use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Raw outcome of a single diagnostic probe
#[derive(Debug, Clone, PartialEq)]
pub enum FacetValue {
    /// A JSON object returned by the service
    Structured(Map<String, Value>),
    /// A JSON array returned by the service
    List(Vec<Value>),
    /// A string, number, boolean or null
    Scalar(Value),
    /// Human-readable description of a failed probe
    ErrorText(String),
}

impl FacetValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => FacetValue::Structured(map),
            Value::Array(items) => FacetValue::List(items),
            other => FacetValue::Scalar(other),
        }
    }

    pub fn text_scalar(text: impl Into<String>) -> Self {
        FacetValue::Scalar(Value::String(text.into()))
    }

    pub fn error(text: impl Into<String>) -> Self {
        FacetValue::ErrorText(text.into())
    }

    /// Empty values never make it into a `DiagnosticsResult`
    pub fn is_empty(&self) -> bool {
        match self {
            FacetValue::Structured(map) => map.is_empty(),
            FacetValue::List(items) => items.is_empty(),
            FacetValue::Scalar(Value::Null) => true,
            FacetValue::Scalar(Value::String(s)) => s.is_empty(),
            FacetValue::Scalar(_) => false,
            FacetValue::ErrorText(text) => text.is_empty(),
        }
    }

    pub fn as_structured(&self) -> Option<&Map<String, Value>> {
        match self {
            FacetValue::Structured(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            FacetValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Only a string scalar, never error text
    pub fn as_scalar_str(&self) -> Option<&str> {
        match self {
            FacetValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// String scalars and error text alike
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FacetValue::Scalar(Value::String(s)) => Some(s),
            FacetValue::ErrorText(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FacetValue::Scalar(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Textual representation used for substring matching
    pub fn text(&self) -> String {
        match self {
            FacetValue::Scalar(Value::String(s)) => s.clone(),
            FacetValue::ErrorText(text) => text.clone(),
            other => other.to_json().to_string(),
        }
    }

    /// Body text for rendering: pretty JSON for trees, plain text for scalars
    pub fn pretty(&self, indent: usize) -> String {
        match self {
            FacetValue::Structured(_) | FacetValue::List(_) => {
                pretty_json(&self.to_json(), indent)
            }
            FacetValue::Scalar(Value::String(s)) => s.clone(),
            FacetValue::Scalar(other) => other.to_string(),
            FacetValue::ErrorText(text) => text.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FacetValue::Structured(map) => Value::Object(map.clone()),
            FacetValue::List(items) => Value::Array(items.clone()),
            FacetValue::Scalar(value) => value.clone(),
            FacetValue::ErrorText(text) => Value::String(text.clone()),
        }
    }
}

impl From<Value> for FacetValue {
    fn from(value: Value) -> Self {
        FacetValue::from_json(value)
    }
}

impl Serialize for FacetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Serialize JSON with an explicit indent width
pub fn pretty_json(value: &Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Facets of one service invocation, in probe order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticsResult {
    entries: Vec<(String, FacetValue)>,
}

impl DiagnosticsResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a facet, replacing an existing one with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: FacetValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FacetValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn without_empty(mut self) -> Self {
        self.entries.retain(|(_, value)| !value.is_empty());
        self
    }
}

impl Serialize for DiagnosticsResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
