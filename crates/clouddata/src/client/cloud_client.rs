//! Record client and database handle resolution.
//!
//! # Sharing
//!
//! `CloudClient` is cheaply cloneable: clones share the configuration, the
//! provider, the token store and the resolved container. The container and
//! its database handles are resolved on first use and reused for the lifetime
//! of the client.
//!
//! ```ignore
//! let config = CloudConfig::private("iCloud.com.example.recipes").with_zone("Recipes");
//! let client = CloudClient::new(config, provider);
//!
//! let recipes: Vec<Recipe> = client.fetch_decoded("Recipe", None).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::CloudConfig;
use crate::changes::{ChangeTokenStore, ZoneChanges, ZoneKey};
use crate::database::{Container, Database};
use crate::provider::RecordProvider;
use crate::query::{Query, QueryCursor};
use crate::record::{Fields, FromFields, Record, ZoneId};
use crate::{
    Error, Partition, RemoteError, Result, TRACING_TARGET_CHANGES, TRACING_TARGET_CLIENT,
};

/// Field projected by [`CloudClient::fetch_changed_names`].
pub const NAME_FIELD: &str = "name";

/// Client for fetching records from one partition of a remote container.
#[derive(Clone)]
pub struct CloudClient {
    inner: Arc<CloudClientInner>,
}

struct CloudClientInner {
    config: CloudConfig,
    provider: Arc<dyn RecordProvider>,
    token_store: Option<Arc<dyn ChangeTokenStore>>,
    container: OnceLock<Container>,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("config", &self.inner.config)
            .field("token_store", &self.inner.token_store.is_some())
            .field("resolved", &self.inner.container.get().is_some())
            .finish_non_exhaustive()
    }
}

impl CloudClient {
    /// Creates a client owning `config` that talks to the platform through `provider`.
    pub fn new(config: CloudConfig, provider: impl RecordProvider + 'static) -> Self {
        Self::with_shared_provider(config, Arc::new(provider))
    }

    /// Creates a client from an already shared provider.
    pub fn with_shared_provider(config: CloudConfig, provider: Arc<dyn RecordProvider>) -> Self {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            container = %config.container_identifier(),
            partition = %config.partition(),
            zone = ?config.zone(),
            "Creating cloud client"
        );

        Self {
            inner: Arc::new(CloudClientInner {
                config,
                provider,
                token_store: None,
                container: OnceLock::new(),
            }),
        }
    }

    /// Persists zone change tokens in `store` so change enumerations are incremental.
    #[must_use]
    pub fn with_token_store(self, store: impl ChangeTokenStore + 'static) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(CloudClientInner {
                config: inner.config.clone(),
                provider: Arc::clone(&inner.provider),
                token_store: Some(Arc::new(store)),
                container: OnceLock::new(),
            }),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &CloudConfig {
        &self.inner.config
    }

    /// Returns the container, resolving it on first use.
    pub fn container(&self) -> &Container {
        self.inner.container.get_or_init(|| {
            tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                container = %self.inner.config.container_identifier(),
                "Resolved container"
            );
            Container::new(self.inner.config.container_identifier())
        })
    }

    /// Returns the database handle of the configured partition.
    ///
    /// Repeated calls return the same handle.
    pub fn database(&self) -> &Database {
        self.container().database(self.inner.config.partition())
    }

    /// Resolves the zone a fetch targets.
    ///
    /// The zone named by the caller wins, then the configured zone, then the
    /// default zone.
    pub fn resolve_zone(&self, zone_name: Option<&str>) -> ZoneId {
        zone_name
            .or(self.inner.config.zone())
            .map_or_else(ZoneId::default_zone, ZoneId::new)
    }

    /// Returns the private database, or fails for other partitions without
    /// contacting the platform.
    fn private_database(&self) -> Result<&Database> {
        match self.inner.config.partition() {
            Partition::Private => Ok(self.database()),
            partition => {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    %partition,
                    "Fetch requested against an unsupported partition"
                );
                Err(Error::unsupported_partition(partition))
            }
        }
    }
}

// Query fetches
impl CloudClient {
    /// Fetches every record of `record_type` in a zone.
    ///
    /// Only the private partition is supported; other partitions fail with
    /// [`Error::UnsupportedPartition`]. The first record-level failure fails
    /// the whole call and no partial list is returned.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn fetch_records(
        &self,
        record_type: &str,
        zone_name: Option<&str>,
    ) -> Result<Vec<Record>> {
        let database = self.private_database()?;
        let zone = self.resolve_zone(zone_name);
        let query = Query::all(record_type);

        let mut records = Vec::new();
        let mut cursor: Option<QueryCursor> = None;
        let mut pages = 0_usize;

        loop {
            let page = self
                .inner
                .provider
                .query(database, &zone, &query, cursor.as_ref())
                .await?;
            pages += 1;

            for result in page.results {
                let record = result.map_err(|err| {
                    tracing::warn!(
                        target: TRACING_TARGET_CLIENT,
                        zone = %zone,
                        record = ?err.record_name,
                        error = %err,
                        "Record failed in query result"
                    );
                    Error::Remote(err)
                })?;
                records.push(record);
            }

            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            zone = %zone,
            record_type = %record_type,
            count = records.len(),
            pages,
            "Fetched records"
        );
        Ok(records)
    }

    /// Fetches every record of `record_type` and decodes each into `T`.
    ///
    /// A single record that fails to decode fails the whole call with
    /// [`Error::RecordDecode`].
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn fetch_decoded<T>(&self, record_type: &str, zone_name: Option<&str>) -> Result<Vec<T>>
    where
        T: FromFields,
    {
        self.fetch_records(record_type, zone_name)
            .await?
            .iter()
            .map(Record::decode::<T>)
            .collect()
    }

    /// Fetches every record of `record_type` as plain field mappings.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn fetch_fields(
        &self,
        record_type: &str,
        zone_name: Option<&str>,
    ) -> Result<Vec<Fields>> {
        let records = self.fetch_records(record_type, zone_name).await?;
        Ok(records.into_iter().map(Record::into_fields).collect())
    }
}

// Change enumeration
impl CloudClient {
    /// Enumerates the changes of a zone until the server reports no more pages.
    ///
    /// Pages are requested one after another, each passing the token of the
    /// previous page. With a token store the enumeration starts from the
    /// stored token and the final token is saved; without one it starts from
    /// the beginning of the zone's history every time.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CHANGES)]
    pub async fn fetch_zone_changes(&self, zone_name: Option<&str>) -> Result<ZoneChanges> {
        let database = self.private_database()?;
        let zone = self.resolve_zone(zone_name);
        let key = ZoneKey::new(database, &zone);

        let mut token = match &self.inner.token_store {
            Some(store) => store.load(&key).await?,
            None => None,
        };
        tracing::debug!(
            target: TRACING_TARGET_CHANGES,
            zone = %zone,
            resumed = token.is_some(),
            "Enumerating zone changes"
        );

        let mut changes = ZoneChanges::default();
        loop {
            let page = self
                .inner
                .provider
                .zone_changes(database, &zone, token.as_ref())
                .await?;

            let modified = page
                .modified
                .into_iter()
                .collect::<Result<Vec<_>, RemoteError>>()?;
            let more_coming = page.more_coming;

            tracing::trace!(
                target: TRACING_TARGET_CHANGES,
                page = changes.pages + 1,
                modified = modified.len(),
                deleted = page.deleted.len(),
                more_coming,
                "Received change page"
            );

            changes.merge(modified, page.deleted, page.token.clone());
            token = Some(page.token);

            if !more_coming {
                break;
            }
        }

        if let (Some(store), Some(token)) = (&self.inner.token_store, &changes.token) {
            store.save(&key, token.clone()).await?;
        }

        tracing::debug!(
            target: TRACING_TARGET_CHANGES,
            zone = %zone,
            pages = changes.pages,
            modified = changes.len(),
            deleted = changes.deleted.len(),
            "Enumerated zone changes"
        );
        Ok(changes)
    }

    /// Enumerates the changes of a zone, mapping each modified record name to
    /// one string field. Records without the field are skipped.
    pub async fn fetch_changed_field(
        &self,
        zone_name: Option<&str>,
        field: &str,
    ) -> Result<HashMap<String, String>> {
        Ok(self.fetch_zone_changes(zone_name).await?.project(field))
    }

    /// Enumerates the changes of a zone, mapping each modified record name to
    /// its `name` field.
    pub async fn fetch_changed_names(
        &self,
        zone_name: Option<&str>,
    ) -> Result<HashMap<String, String>> {
        self.fetch_changed_field(zone_name, NAME_FIELD).await
    }

    /// Forgets the stored change token of a zone so the next enumeration is full.
    ///
    /// Does nothing when the client has no token store.
    pub async fn reset_change_token(&self, zone_name: Option<&str>) -> Result<()> {
        let Some(store) = &self.inner.token_store else {
            return Ok(());
        };
        let zone = self.resolve_zone(zone_name);
        let key = ZoneKey::new(self.database(), &zone);
        store.clear(&key).await
    }
}
