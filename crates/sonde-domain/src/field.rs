use crate::record::{Location, ScalarValue};
use serde_json::{Map, Value};
use tracing::debug;

/// Per-field override carried inside a nested object value
///
/// Attributes present here replace the defaults the flattener would
/// otherwise derive from the field key and the ambient serie.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverrideField {
    pub variable: Option<String>,
    pub value: Option<ScalarValue>,
    pub serie: Option<String>,
    pub unit: Option<String>,
    pub location: Option<Location>,
    pub metadata: Option<Map<String, Value>>,
}

impl OverrideField {
    /// Pick the known override attributes out of a JSON object
    ///
    /// Unknown keys are ignored. A numeric serie is coerced to text, the
    /// form some device firmware reports it in.
    pub fn from_json(mut object: Map<String, Value>) -> Self {
        let variable = match object.remove("variable") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let value = object.remove("value").and_then(|v| ScalarValue::from_json(&v));
        let serie = match object.remove("serie") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        let unit = match object.remove("unit") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let location = match object.remove("location") {
            Some(value) => match serde_json::from_value(value) {
                Ok(location) => Some(location),
                Err(err) => {
                    debug!(error = %err, "dropping malformed override location");
                    None
                }
            },
            None => None,
        };
        let metadata = match object.remove("metadata") {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };

        Self {
            variable,
            value,
            serie,
            unit,
            location,
            metadata,
        }
    }
}

/// Value shape a flat-object field can take
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(ScalarValue),
    Override(OverrideField),
}

/// Insertion-ordered field map, the flattener's input shape
///
/// Key order is load-bearing: the flattener emits records in it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a JSON object, preserving key order
    ///
    /// Scalars map to [`FieldValue::Scalar`] and nested objects to
    /// [`FieldValue::Override`]. Null and array values have no record
    /// representation and are dropped.
    pub fn from_json(object: Map<String, Value>) -> Self {
        let mut fields = FieldMap::new();
        for (key, value) in object {
            match value {
                Value::Null => {
                    debug!(field = %key, "dropping null field value");
                }
                Value::Array(_) => {
                    debug!(field = %key, "dropping array field value");
                }
                Value::Object(map) => {
                    fields
                        .entries
                        .push((key, FieldValue::Override(OverrideField::from_json(map))));
                }
                scalar => {
                    if let Some(value) = ScalarValue::from_json(&scalar) {
                        fields.entries.push((key, FieldValue::Scalar(value)));
                    }
                }
            }
        }
        fields
    }

    /// Insert a field, replacing an existing one in place
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
