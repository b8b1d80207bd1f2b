//! Change pages and their merged result.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordId, RecordResult};

/// Opaque server token marking a point in a zone's change history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeToken(pub String);

impl ChangeToken {
    /// Creates a token from its server representation.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the server representation.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a zone change enumeration.
#[derive(Debug, Clone)]
pub struct ChangePage {
    /// Records created or modified since the requested token.
    pub modified: Vec<RecordResult>,
    /// Records deleted since the requested token.
    pub deleted: Vec<RecordId>,
    /// Token to pass when requesting the next page.
    pub token: ChangeToken,
    /// Continuation flag: more pages remain.
    pub more_coming: bool,
}

impl ChangePage {
    /// Creates a page with only modifications.
    pub fn new(modified: Vec<RecordResult>, token: ChangeToken, more_coming: bool) -> Self {
        Self {
            modified,
            deleted: Vec::new(),
            token,
            more_coming,
        }
    }

    /// Adds deletions to the page.
    #[must_use]
    pub fn with_deleted(mut self, deleted: Vec<RecordId>) -> Self {
        self.deleted = deleted;
        self
    }
}

/// All changes of a zone merged across pages.
#[derive(Debug, Clone, Default)]
pub struct ZoneChanges {
    /// Modified records sorted by record name; later pages win.
    pub modified: BTreeMap<String, Record>,
    /// Deleted records, in server order. Never overlaps `modified`.
    pub deleted: Vec<RecordId>,
    /// Token of the last page, to resume from.
    pub token: Option<ChangeToken>,
    /// Number of pages requested.
    pub pages: usize,
}

impl ZoneChanges {
    /// Merges one page into the running result.
    pub(crate) fn merge(&mut self, modified: Vec<Record>, deleted: Vec<RecordId>, token: ChangeToken) {
        for record in modified {
            let name = record.record_id.record_name.clone();
            self.deleted.retain(|id| id.record_name != name);
            self.modified.insert(name, record);
        }
        for id in &deleted {
            self.modified.remove(&id.record_name);
        }
        self.deleted.extend(deleted);
        self.token = Some(token);
        self.pages += 1;
    }

    /// Returns the number of modified records.
    #[inline]
    pub fn len(&self) -> usize {
        self.modified.len()
    }

    /// Check if no record was modified.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    /// Projects each modified record to one string field.
    ///
    /// Records without the field, or where it is not a string, are skipped.
    pub fn project(&self, field: &str) -> HashMap<String, String> {
        self.modified
            .iter()
            .filter_map(|(name, record)| {
                record
                    .field_str(field)
                    .map(|value| (name.clone(), value.to_owned()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ZoneId;

    fn record(name: &str, title: Option<&str>) -> Record {
        let record = Record::new(RecordId::new(name, ZoneId::new("Recipes")), "Recipe");
        match title {
            Some(title) => record.with_field("name", title),
            None => record,
        }
    }

    #[test]
    fn test_merge_later_pages_win() {
        let mut changes = ZoneChanges::default();
        changes.merge(
            vec![record("a", Some("Old")), record("b", Some("Bread"))],
            vec![],
            ChangeToken::new("t1"),
        );
        changes.merge(vec![record("a", Some("New"))], vec![], ChangeToken::new("t2"));

        assert_eq!(changes.len(), 2);
        assert_eq!(changes.pages, 2);
        assert_eq!(changes.token, Some(ChangeToken::new("t2")));
        assert_eq!(changes.project("name")["a"], "New");
    }

    #[test]
    fn test_merge_deletions_remove_modified() {
        let mut changes = ZoneChanges::default();
        changes.merge(vec![record("a", Some("Soup"))], vec![], ChangeToken::new("t1"));
        changes.merge(
            vec![],
            vec![RecordId::new("a", ZoneId::new("Recipes"))],
            ChangeToken::new("t2"),
        );

        assert!(changes.is_empty());
        assert_eq!(changes.deleted.len(), 1);
    }

    #[test]
    fn test_merge_recreate_after_delete() {
        let mut changes = ZoneChanges::default();
        changes.merge(
            vec![],
            vec![
                RecordId::new("a", ZoneId::new("Recipes")),
                RecordId::new("b", ZoneId::new("Recipes")),
            ],
            ChangeToken::new("t1"),
        );
        changes.merge(vec![record("a", Some("Soup"))], vec![], ChangeToken::new("t2"));

        assert_eq!(changes.project("name")["a"], "Soup");
        assert_eq!(changes.deleted, vec![RecordId::new("b", ZoneId::new("Recipes"))]);
    }

    #[test]
    fn test_modified_sorted_by_record_name() {
        let mut changes = ZoneChanges::default();
        changes.merge(
            vec![record("c", None), record("a", None)],
            vec![],
            ChangeToken::new("t1"),
        );
        changes.merge(vec![record("b", None)], vec![], ChangeToken::new("t2"));

        let names: Vec<_> = changes.modified.keys().map(String::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_project_skips_missing_field() {
        let mut changes = ZoneChanges::default();
        changes.merge(
            vec![record("a", Some("Soup")), record("b", None)],
            vec![],
            ChangeToken::new("t1"),
        );

        let names = changes.project("name");
        assert_eq!(names.len(), 1);
        assert_eq!(names["a"], "Soup");
    }
}
