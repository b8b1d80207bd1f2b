//! Prelude module for clouddata.
//!
//! This module re-exports the most commonly used types and traits from clouddata,
//! making it easy to import everything you need with a single `use` statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use clouddata::prelude::*;
//!
//! # async fn example(provider: impl RecordProvider + 'static) -> Result<()> {
//! let config = CloudConfig::private("iCloud.com.example.recipes");
//! let client = CloudClient::new(config, provider);
//! let records = client.fetch_records("Recipe", None).await?;
//! # Ok(())
//! # }
//! ```

// Client types
pub use crate::client::{CloudClient, CloudConfig, Partition};
// Change enumeration types
pub use crate::changes::{ChangeToken, ChangeTokenStore, MemoryTokenStore, ZoneChanges};
// Provider types
pub use crate::provider::RecordProvider;
#[cfg(feature = "test-utils")]
pub use crate::provider::MemoryProvider;
#[cfg(feature = "reqwest")]
pub use crate::provider::web::{WebServiceConfig, WebServiceProvider};
// Record types
pub use crate::record::{Fields, FromFields, Record, RecordId, ZoneId};
// Error types
pub use crate::{Error, RemoteError, RemoteErrorCode, Result};
