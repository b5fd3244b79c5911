//! Records and record identifiers.
//!
//! A record is an opaque JSON object keyed by field name. The table only
//! interprets the identifier field; everything else is coerced to a string
//! for display.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The default name of the identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// A numeric record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Parse an identifier from a JSON value.
    ///
    /// Accepts integral numbers and strings holding an integer, since some
    /// servers return identifiers as strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .map(RecordId)
    }
}

/// `f` as an `i64` if it is integral and in range. `i64::MAX as f64` rounds
/// up to 2^63, so the upper bound is exclusive.
fn integral_f64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (in_range && f.fract() == 0.0).then_some(f as i64)
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId(id)
    }
}

/// A single entity instance as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style field assignment.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Assign a field value, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// The record's identifier, read from `id_field`.
    pub fn id(&self, id_field: &str) -> Option<RecordId> {
        self.get(id_field).and_then(RecordId::from_value)
    }

    /// Rewrite the identifier field as a JSON number.
    ///
    /// Returns the parsed identifier, or `None` if the field is missing or
    /// not numeric (in which case the record is left untouched).
    pub fn coerce_id(&mut self, id_field: &str) -> Option<RecordId> {
        let id = self.id(id_field)?;
        self.set(id_field, id.0);
        Some(id)
    }

    /// The string form of a field, empty for missing or null values.
    pub fn display(&self, field: &str) -> String {
        self.get(field).map(display_value).unwrap_or_default()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Convert a JSON value to its display string.
///
/// Strings are shown without quotes, null as the empty string, and compound
/// values as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
