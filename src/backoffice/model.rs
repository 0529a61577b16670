use crate::fields::FieldValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// Partial record: the values a create or update intent carries.
pub type Draft = BTreeMap<String, FieldValue>;

/// A record the engine can manage.
///
/// The engine only needs a stable identifier and a way to read a field by key.
/// Keys the record does not have must read as [`FieldValue::Empty`].
pub trait Resource: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Ord + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    fn field(&self, key: &str) -> FieldValue;
}

/// Identifier of a dynamic [`Record`].
///
/// Stored as text; JSON numbers are accepted on input so backends that hand
/// out numeric ids round-trip.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Int(n) => RecordId(n.to_string()),
            Raw::Float(n) => RecordId(FieldValue::Number(n).to_string()),
        })
    }
}

/// Schemaless record: an identifier plus a key/value map.
///
/// Serialises as a flat JSON object with the identifier under `"id"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a field. Setting `Empty` removes the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        match value.into() {
            FieldValue::Empty => {
                self.fields.remove(&key);
            }
            value => {
                self.fields.insert(key, value);
            }
        }
    }

    /// Builds a record from a create draft.
    ///
    /// A non-empty value under `id_key` becomes the identifier; otherwise
    /// `fallback` is used. An id key other than `"id"` also keeps the
    /// identifier as a field, so it reads back like any other column.
    pub fn from_draft(id_key: &str, mut draft: Draft, fallback: RecordId) -> Self {
        let id = match draft.remove(id_key) {
            Some(v) if !v.is_empty() => RecordId(v.to_string()),
            _ => fallback,
        };
        let mut record = Record::new(id);
        if id_key != "id" {
            let value = FieldValue::Text(record.id.0.clone());
            record.fields.insert(id_key.to_string(), value);
        }
        record.apply(id_key, draft);
        record
    }

    /// Merges a partial update into the record. The identifier, whether under
    /// `"id"` or `id_key`, never changes.
    pub fn apply(&mut self, id_key: &str, draft: Draft) {
        for (key, value) in draft {
            if key == "id" || key == id_key {
                continue;
            }
            self.set(key, value);
        }
    }
}

impl Resource for Record {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        if key == "id" {
            return FieldValue::Text(self.id.0.clone());
        }
        self.fields.get(key).cloned().unwrap_or_default()
    }
}
