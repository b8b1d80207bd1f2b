//! Record queries and query result pages.

use serde::{Deserialize, Serialize};

use crate::record::RecordResult;

/// Server-side filter of a query.
///
/// Only the unconditional predicate is supported: queries select every record
/// of a type in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every record.
    #[default]
    All,
}

/// A query selecting records of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Record type to select.
    pub record_type: String,
    /// Server-side filter.
    #[serde(default)]
    pub predicate: Predicate,
    /// Fields to return; `None` returns all fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_keys: Option<Vec<String>>,
}

impl Query {
    /// Selects all records of `record_type`, returning all fields.
    pub fn all(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            predicate: Predicate::All,
            desired_keys: None,
        }
    }
}

/// Opaque continuation marker of a partially returned query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryCursor(pub String);

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    /// Result-or-error per matched record, in server order.
    pub results: Vec<RecordResult>,
    /// Set when more results remain.
    pub cursor: Option<QueryCursor>,
}

impl QueryPage {
    /// Creates a final page.
    pub fn new(results: Vec<RecordResult>) -> Self {
        Self {
            results,
            cursor: None,
        }
    }

    /// Marks the page as partial.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(QueryCursor(cursor.into()));
        self
    }
}
