//! In-memory record provider for testing.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! clouddata = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use clouddata::provider::MemoryProvider;
//!
//! let provider = MemoryProvider::new()
//!     .with_record(Partition::Private, record)
//!     .with_page_size(50);
//!
//! let client = CloudClient::new(config, provider.clone());
//! let records = client.fetch_records("Recipe", None).await?;
//! assert_eq!(provider.query_calls(), 1);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::RecordProvider;
use crate::changes::{ChangePage, ChangeToken};
use crate::Partition;
use crate::database::Database;
use crate::query::{Query, QueryCursor, QueryPage};
use crate::record::{Record, RecordResult, ZoneId};
use crate::{Error, RemoteError, RemoteErrorCode, Result, TRACING_TARGET_PROVIDER};

type ZoneEntries = Vec<(String, RecordResult)>;

#[derive(Debug, Default)]
struct MemoryProviderInner {
    zones: RwLock<HashMap<(Partition, ZoneId), ZoneEntries>>,
    change_pages: RwLock<HashMap<(Partition, ZoneId), Vec<ChangePage>>>,
    query_failure: RwLock<Option<RemoteError>>,
    requested_tokens: RwLock<Vec<Option<ChangeToken>>>,
    page_size: Option<usize>,
    query_calls: AtomicUsize,
    change_calls: AtomicUsize,
}

/// In-memory [`RecordProvider`] with request counters.
///
/// Clones share the same state, so a test can keep one clone to seed data and
/// inspect counters after handing another to a client.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    inner: Arc<MemoryProviderInner>,
}

impl MemoryProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits query results into pages of `page_size` records.
    ///
    /// Must be called before the provider is cloned.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.page_size = Some(page_size.max(1));
        }
        self
    }

    /// Adds a record to its zone in `partition`.
    #[must_use]
    pub fn with_record(self, partition: Partition, record: Record) -> Self {
        self.insert_record(partition, record);
        self
    }

    /// Adds a per-record failure to a zone, matched by queries for `record_type`.
    #[must_use]
    pub fn with_record_error(
        self,
        partition: Partition,
        zone: ZoneId,
        record_type: impl Into<String>,
        error: RemoteError,
    ) -> Self {
        write(&self.inner.zones)
            .entry((partition, zone))
            .or_default()
            .push((record_type.into(), Err(error)));
        self
    }

    /// Creates an empty zone, so queries against it succeed with no results.
    #[must_use]
    pub fn with_zone(self, partition: Partition, zone: ZoneId) -> Self {
        write(&self.inner.zones)
            .entry((partition, zone))
            .or_default();
        self
    }

    /// Appends a scripted change page to a zone.
    ///
    /// The first page answers requests from the beginning of history; each
    /// following page answers requests carrying the previous page's token.
    #[must_use]
    pub fn with_change_page(self, partition: Partition, zone: ZoneId, page: ChangePage) -> Self {
        write(&self.inner.change_pages)
            .entry((partition, zone))
            .or_default()
            .push(page);
        self
    }

    /// Makes every query call fail with `error`.
    #[must_use]
    pub fn with_query_failure(self, error: RemoteError) -> Self {
        *write(&self.inner.query_failure) = Some(error);
        self
    }

    /// Adds a record to its zone in `partition`.
    pub fn insert_record(&self, partition: Partition, record: Record) {
        let zone = record.record_id.zone.clone();
        write(&self.inner.zones)
            .entry((partition, zone))
            .or_default()
            .push((record.record_type.clone(), Ok(record)));
    }

    /// Returns the number of query requests received.
    pub fn query_calls(&self) -> usize {
        self.inner.query_calls.load(Ordering::SeqCst)
    }

    /// Returns the number of change requests received.
    pub fn change_calls(&self) -> usize {
        self.inner.change_calls.load(Ordering::SeqCst)
    }

    /// Returns the total number of requests received.
    pub fn total_calls(&self) -> usize {
        self.query_calls() + self.change_calls()
    }

    /// Returns the `since` token of every change request, in order.
    pub fn requested_tokens(&self) -> Vec<Option<ChangeToken>> {
        read(&self.inner.requested_tokens).clone()
    }

    fn parse_cursor(cursor: Option<&QueryCursor>) -> Result<usize> {
        match cursor {
            None => Ok(0),
            Some(QueryCursor(offset)) => offset.parse().map_err(|_| {
                RemoteError::new(
                    RemoteErrorCode::BadRequest,
                    format!("invalid continuation marker '{offset}'"),
                )
                .into()
            }),
        }
    }
}

#[async_trait::async_trait]
impl RecordProvider for MemoryProvider {
    async fn query(
        &self,
        database: &Database,
        zone: &ZoneId,
        query: &Query,
        cursor: Option<&QueryCursor>,
    ) -> Result<QueryPage> {
        self.inner.query_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = read(&self.inner.query_failure).clone() {
            return Err(Error::Remote(error));
        }

        let zones = read(&self.inner.zones);
        let entries = match zones.get(&(database.partition(), zone.clone())) {
            Some(entries) => entries.as_slice(),
            None if zone.is_default() => &[][..],
            None => return Err(RemoteError::zone_not_found(&zone.zone_name).into()),
        };

        let matched: Vec<RecordResult> = entries
            .iter()
            .filter(|(record_type, _)| *record_type == query.record_type)
            .map(|(_, result)| result.clone())
            .collect();

        let offset = Self::parse_cursor(cursor)?;
        let page_size = self.inner.page_size.unwrap_or(usize::MAX);
        let end = offset.saturating_add(page_size).min(matched.len());
        let results = matched.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();

        tracing::trace!(
            target: TRACING_TARGET_PROVIDER,
            zone = %zone,
            record_type = %query.record_type,
            offset,
            count = results.len(),
            "Served in-memory query page"
        );

        let page = QueryPage::new(results);
        Ok(if end < matched.len() {
            page.with_cursor(end.to_string())
        } else {
            page
        })
    }

    async fn zone_changes(
        &self,
        database: &Database,
        zone: &ZoneId,
        since: Option<&ChangeToken>,
    ) -> Result<ChangePage> {
        self.inner.change_calls.fetch_add(1, Ordering::SeqCst);
        write(&self.inner.requested_tokens).push(since.cloned());

        let scripted = read(&self.inner.change_pages);
        let pages = match scripted.get(&(database.partition(), zone.clone())) {
            Some(pages) => pages.as_slice(),
            None if zone.is_default() => &[][..],
            None => return Err(RemoteError::zone_not_found(&zone.zone_name).into()),
        };

        let next = match since {
            None => 0,
            Some(token) => pages
                .iter()
                .position(|page| &page.token == token)
                .map_or(pages.len(), |index| index + 1),
        };

        Ok(pages.get(next).cloned().unwrap_or_else(|| {
            let token = since
                .cloned()
                .unwrap_or_else(|| ChangeToken::new("0"));
            ChangePage::new(Vec::new(), token, false)
        }))
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
