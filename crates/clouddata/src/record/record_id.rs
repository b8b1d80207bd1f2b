//! Zone and record identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the zone every partition provides without creating it.
pub const DEFAULT_ZONE_NAME: &str = "_defaultZone";

/// Identifies a zone within a database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId {
    /// Name of the zone.
    pub zone_name: String,
    /// Owner of the zone; `None` means the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

impl ZoneId {
    /// Creates a zone identifier owned by the signed-in user.
    pub fn new(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            owner_name: None,
        }
    }

    /// Returns the default zone.
    pub fn default_zone() -> Self {
        Self::new(DEFAULT_ZONE_NAME)
    }

    /// Sets the zone owner.
    #[must_use]
    pub fn with_owner(mut self, owner_name: impl Into<String>) -> Self {
        self.owner_name = Some(owner_name.into());
        self
    }

    /// Check if this is the default zone.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.zone_name == DEFAULT_ZONE_NAME
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::default_zone()
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner_name {
            Some(owner) => write!(f, "{}:{}", self.zone_name, owner),
            None => f.write_str(&self.zone_name),
        }
    }
}

/// Server-assigned record key, scoped to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    /// Server-assigned record name.
    pub record_name: String,
    /// Zone holding the record.
    #[serde(default)]
    pub zone: ZoneId,
}

impl RecordId {
    /// Creates a record identifier in the given zone.
    pub fn new(record_name: impl Into<String>, zone: ZoneId) -> Self {
        Self {
            record_name: record_name.into(),
            zone,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.record_name)
    }
}
