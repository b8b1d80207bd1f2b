//! Persistence of zone change tokens between enumerations.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::ChangeToken;
use crate::Partition;
use crate::database::Database;
use crate::record::ZoneId;
use crate::{Result, TRACING_TARGET_CHANGES};

/// Identifies the change history a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    /// Container identifier.
    pub container_identifier: String,
    /// Database partition.
    pub partition: Partition,
    /// Zone within the partition.
    pub zone: ZoneId,
}

impl ZoneKey {
    /// Creates a key for `zone` of `database`.
    pub fn new(database: &Database, zone: &ZoneId) -> Self {
        Self {
            container_identifier: database.container_identifier().to_owned(),
            partition: database.partition(),
            zone: zone.clone(),
        }
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.container_identifier, self.partition, self.zone
        )
    }
}

/// Caller-supplied storage for change tokens.
///
/// When a client has a store, change enumerations resume from the stored
/// token and save the token of their last page. Without one, every
/// enumeration starts from the beginning of the zone's history.
#[async_trait::async_trait]
pub trait ChangeTokenStore: Send + Sync {
    /// Loads the token to resume `key` from.
    async fn load(&self, key: &ZoneKey) -> Result<Option<ChangeToken>>;

    /// Saves the token reached for `key`.
    async fn save(&self, key: &ZoneKey, token: ChangeToken) -> Result<()>;

    /// Forgets the token of `key`, forcing a full enumeration next time.
    async fn clear(&self, key: &ZoneKey) -> Result<()>;
}

/// In-process token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<RwLock<HashMap<ZoneKey, ChangeToken>>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tokens.
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Check if no token is stored.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ChangeTokenStore for MemoryTokenStore {
    async fn load(&self, key: &ZoneKey) -> Result<Option<ChangeToken>> {
        Ok(self.tokens.read().await.get(key).cloned())
    }

    async fn save(&self, key: &ZoneKey, token: ChangeToken) -> Result<()> {
        tracing::trace!(
            target: TRACING_TARGET_CHANGES,
            zone = %key,
            token = %token.as_str(),
            "Stored change token"
        );
        self.tokens.write().await.insert(key.clone(), token);
        Ok(())
    }

    async fn clear(&self, key: &ZoneKey) -> Result<()> {
        self.tokens.write().await.remove(key);
        Ok(())
    }
}
