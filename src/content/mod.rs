//! Content fetching from the headless CMS.
//!
//! Two call shapes are consumed through [`ContentSource`]:
//!
//! - `sync`: full (no token) or delta (with token) change feed
//! - `entries`: all entries of one content type, with linked records included
//!
//! [`DeliveryClient`] implements both over HTTP. [`resolve`] embeds linked
//! entries and assets before anything reaches the renderer.

mod delivery;
mod error;
pub mod management;
pub mod resolve;
#[cfg(test)]
pub(crate) mod stub;
pub mod types;

pub use delivery::DeliveryClient;
pub use error::FetchError;
pub use types::{Asset, Entry};

use crate::state::SyncToken;

/// Records returned by one sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub entries: Vec<Entry>,
    pub assets: Vec<Asset>,
    pub deleted_entries: Vec<String>,
    pub deleted_assets: Vec<String>,
    /// Token for the next delta; `None` for query fetches.
    pub next_token: Option<SyncToken>,
}

/// Entries of one content type plus the records they link to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryCollection {
    pub items: Vec<Entry>,
    pub included_entries: Vec<Entry>,
    pub included_assets: Vec<Asset>,
}

/// A source of CMS content.
pub trait ContentSource {
    /// Full sync when `token` is `None`, otherwise the changes since `token`.
    fn sync(&self, token: Option<&SyncToken>) -> Result<FetchResult, FetchError>;

    /// Every entry of `content_type`.
    fn entries(&self, content_type: &str) -> Result<EntryCollection, FetchError>;
}
