//! Zone change enumeration.
//!
//! A change enumeration asks for "changes since token" repeatedly, passing the
//! token of each page to the next request, until the server clears the
//! continuation flag. Pages of modified records are merged into a
//! [`ZoneChanges`] keyed by record name.
//!
//! Tokens only persist across enumerations when the client is given a
//! [`ChangeTokenStore`]:
//!
//! ```rust,ignore
//! let client = CloudClient::new(config, provider)
//!     .with_token_store(MemoryTokenStore::new());
//!
//! // First call enumerates the full history, later calls only the delta.
//! let changes = client.fetch_zone_changes(Some("Recipes")).await?;
//! ```

mod token_store;
mod zone_changes;

pub use token_store::{ChangeTokenStore, MemoryTokenStore, ZoneKey};
pub use zone_changes::{ChangePage, ChangeToken, ZoneChanges};
