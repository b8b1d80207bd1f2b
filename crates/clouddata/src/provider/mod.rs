//! Remote platform abstraction.
//!
//! The client talks to the remote platform exclusively through
//! [`RecordProvider`]. Two implementations ship with this crate:
//!
//! - [`MemoryProvider`] (feature `test-utils`): in-process records and
//!   scripted change pages for tests and local development.
//! - [`web::WebServiceProvider`] (feature `reqwest`): the platform's JSON
//!   web-services API over HTTP.

#[cfg(any(test, feature = "test-utils"))]
mod memory;
#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod web;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryProvider;

use crate::Result;
use crate::changes::{ChangePage, ChangeToken};
use crate::database::Database;
use crate::query::{Query, QueryCursor, QueryPage};
use crate::record::ZoneId;

/// Core trait for remote record platform operations.
///
/// Implementations perform exactly one remote request per call and never
/// retry; paging is driven by the caller.
#[async_trait::async_trait]
pub trait RecordProvider: Send + Sync {
    /// Executes `query` against `zone` of `database`.
    ///
    /// A call failure is returned as `Err`; failures of individual matched
    /// records are returned as `Err` items of [`QueryPage::results`].
    /// `cursor` continues a previous partial page.
    async fn query(
        &self,
        database: &Database,
        zone: &ZoneId,
        query: &Query,
        cursor: Option<&QueryCursor>,
    ) -> Result<QueryPage>;

    /// Returns one page of the changes made to `zone` since `since`.
    ///
    /// `None` requests changes since the beginning of the zone's history.
    async fn zone_changes(
        &self,
        database: &Database,
        zone: &ZoneId,
        since: Option<&ChangeToken>,
    ) -> Result<ChangePage>;
}
