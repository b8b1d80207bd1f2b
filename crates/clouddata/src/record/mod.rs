//! Records, their identifiers, and decoding into caller types.

mod decode;
#[allow(clippy::module_inception)]
mod record;
mod record_id;

pub use decode::FromFields;
pub use record::{Fields, Record};
pub use record_id::{DEFAULT_ZONE_NAME, RecordId, ZoneId};

/// Outcome of a single matched record: the record, or why it could not be read.
pub type RecordResult = Result<Record, crate::RemoteError>;
