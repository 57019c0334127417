//! Records and record identifiers
//!
//! A record is an opaque JSON object. The only structural assumption is an
//! identifier field, whose name is configured per entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable record identifier.
///
/// Servers return identifiers as numbers or strings; both compare by their
/// canonical text form, so `7` and `"7"` are the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    /// Read an identifier out of a JSON value. Empty strings, nulls and
    /// compound values are not identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(RecordId(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(RecordId(s.clone())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId(s)
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId(n.to_string())
    }
}

/// One entity record as exchanged with the server
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Record(Map::new())
    }

    /// Wrap a JSON value; only objects are records
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Record(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identifier stored under `id_field`
    pub fn id(&self, id_field: &str) -> Option<RecordId> {
        self.0.get(id_field).and_then(RecordId::from_value)
    }

    pub fn has_id(&self, id_field: &str, id: &RecordId) -> bool {
        self.id(id_field).as_ref() == Some(id)
    }

    /// A field counts as blank when missing, null, or whitespace-only text
    pub fn is_blank(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    /// Display text of one field
    pub fn text(&self, field: &str) -> String {
        self.0.get(field).map(ledgerdesk_utils::value_text).unwrap_or_default()
    }

    /// Lowercased concatenation of every field value, used for search
    pub fn search_text(&self) -> String {
        ledgerdesk_utils::search_text(&self.0)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

/// Build a record from a `json!` object literal in tests and demos
#[macro_export]
macro_rules! record {
    ($($json:tt)+) => {
        $crate::Record::from_value($crate::__serde_json::json!($($json)+)).unwrap_or_default()
    };
}
