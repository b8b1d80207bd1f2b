//! JSON request and response bodies of the web-services API.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{Fields, Record, RecordId, RecordResult, ZoneId};
use crate::{RemoteError, RemoteErrorCode};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireZoneId {
    pub zone_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_record_name: Option<String>,
}

impl From<&ZoneId> for WireZoneId {
    fn from(zone: &ZoneId) -> Self {
        Self {
            zone_name: zone.zone_name.clone(),
            owner_record_name: zone.owner_name.clone(),
        }
    }
}

impl From<WireZoneId> for ZoneId {
    fn from(zone: WireZoneId) -> Self {
        Self {
            zone_name: zone.zone_name,
            owner_name: zone.owner_record_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireQuery<'a> {
    pub record_type: &'a str,
    pub filter_by: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    #[serde(rename = "zoneID")]
    pub zone_id: WireZoneId,
    pub query: WireQuery<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_keys: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_marker: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub records: Vec<WireRecord>,
    #[serde(default)]
    pub continuation_marker: Option<String>,
}

/// Body of `changes/zone`, a batch over zones.
#[derive(Debug, Serialize)]
pub(crate) struct ZoneChangesRequest<'a> {
    pub zones: Vec<ZoneChangesEntry<'a>>,
}

impl<'a> ZoneChangesRequest<'a> {
    /// Requests the changes of a single zone since `sync_token`.
    pub fn single(zone: &ZoneId, sync_token: Option<&'a str>) -> Self {
        Self {
            zones: vec![ZoneChangesEntry {
                zone_id: WireZoneId::from(zone),
                sync_token,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZoneChangesEntry<'a> {
    #[serde(rename = "zoneID")]
    pub zone_id: WireZoneId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZoneChangesResponse {
    #[serde(default)]
    pub zones: Vec<WireZoneChanges>,
}

impl ZoneChangesResponse {
    /// Returns the changes of the single requested zone, or the failure the
    /// server reported for it.
    pub fn into_single(self, zone: &ZoneId) -> Result<ZoneChangeBatch, RemoteError> {
        let Some(entry) = self.zones.into_iter().next() else {
            return Err(RemoteError::new(
                RemoteErrorCode::Unknown,
                format!("no changes returned for zone '{zone}'"),
            ));
        };

        if let Some(code) = entry.server_error_code {
            let message = entry.reason.unwrap_or_else(|| code.clone());
            return Err(RemoteError::new(
                RemoteErrorCode::from_server_code(&code),
                message,
            ));
        }

        let Some(sync_token) = entry.sync_token else {
            return Err(RemoteError::new(
                RemoteErrorCode::Unknown,
                format!("changes of zone '{zone}' without a sync token"),
            ));
        };

        Ok(ZoneChangeBatch {
            records: entry.records,
            sync_token,
            more_coming: entry.more_coming,
        })
    }
}

/// Per-zone entry of a `changes/zone` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireZoneChanges {
    #[serde(default)]
    pub records: Vec<WireRecord>,
    #[serde(default)]
    pub sync_token: Option<String>,
    #[serde(default)]
    pub more_coming: bool,
    #[serde(default)]
    pub server_error_code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Validated changes of one zone.
#[derive(Debug)]
pub(crate) struct ZoneChangeBatch {
    pub records: Vec<WireRecord>,
    pub sync_token: String,
    pub more_coming: bool,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub server_error_code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTimestamp {
    pub timestamp: i64,
}

/// A record entry: a record, a deletion marker, or a per-record failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRecord {
    pub record_name: String,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default, rename = "zoneID")]
    pub zone_id: Option<WireZoneId>,
    #[serde(default)]
    pub record_change_tag: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, Value>,
    #[serde(default)]
    pub created: Option<WireTimestamp>,
    #[serde(default)]
    pub modified: Option<WireTimestamp>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub server_error_code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl WireRecord {
    /// Check if this entry marks a deletion.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the identifier of this entry, defaulting to `zone`.
    pub fn record_id(&self, zone: &ZoneId) -> RecordId {
        let zone = self.zone_id.clone().map_or_else(|| zone.clone(), ZoneId::from);
        RecordId::new(self.record_name.clone(), zone)
    }

    /// Converts the entry into a record, or the failure it reports.
    pub fn into_result(self, zone: &ZoneId) -> RecordResult {
        let record_id = self.record_id(zone);
        if let Some(code) = self.server_error_code {
            let message = self.reason.unwrap_or_else(|| code.clone());
            return Err(
                RemoteError::new(RemoteErrorCode::from_server_code(&code), message)
                    .with_record_name(self.record_name),
            );
        }

        let Some(record_type) = self.record_type else {
            return Err(RemoteError::new(
                RemoteErrorCode::Unknown,
                "record entry without a record type",
            )
            .with_record_name(self.record_name));
        };

        Ok(Record {
            record_id,
            record_type,
            fields: flatten_fields(self.fields),
            change_tag: self.record_change_tag,
            created: self.created.and_then(|t| to_timestamp(&t)),
            modified: self.modified.and_then(|t| to_timestamp(&t)),
        })
    }
}

/// Unwraps typed field values (`{"value": .., "type": ..}`) into plain values.
pub(crate) fn flatten_fields(fields: serde_json::Map<String, Value>) -> Fields {
    fields
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Object(mut typed) if typed.contains_key("value") => {
                    typed.remove("value").unwrap_or(Value::Null)
                }
                other => other,
            };
            (name, value)
        })
        .collect()
}

fn to_timestamp(wire: &WireTimestamp) -> Option<Timestamp> {
    Timestamp::from_millisecond(wire.timestamp).ok()
}
