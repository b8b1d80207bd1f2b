//! Fetched record type.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FromFields, RecordId};
use crate::{Error, Result};

/// Field name to value mapping of a record.
pub type Fields = serde_json::Map<String, Value>;

/// A server-held, type-tagged, field-mapped entity.
///
/// Records have no client-side identity beyond the server-assigned
/// [`RecordId`] and are never cached locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Server-assigned identifier.
    pub record_id: RecordId,
    /// Record type tag (e.g. `Recipe`).
    pub record_type: String,
    /// Field values.
    #[serde(default)]
    pub fields: Fields,
    /// Server change tag of the fetched revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_tag: Option<String>,
    /// Creation time, when reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    /// Last modification time, when reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
}

impl Record {
    /// Creates a record with no fields.
    pub fn new(record_id: RecordId, record_type: impl Into<String>) -> Self {
        Self {
            record_id,
            record_type: record_type.into(),
            fields: Fields::new(),
            change_tag: None,
            created: None,
            modified: None,
        }
    }

    /// Sets a field value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Replaces all field values.
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the change tag.
    #[must_use]
    pub fn with_change_tag(mut self, change_tag: impl Into<String>) -> Self {
        self.change_tag = Some(change_tag.into());
        self
    }

    /// Returns the server-assigned record name.
    #[inline]
    pub fn record_name(&self) -> &str {
        &self.record_id.record_name
    }

    /// Returns a field value.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a field value if it holds a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Consumes the record, returning its field mapping.
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Decodes the record's fields into `T`.
    pub fn decode<T: FromFields>(&self) -> Result<T> {
        T::from_fields(&self.fields)
            .map_err(|source| Error::record_decode(self.record_name(), source))
    }
}
