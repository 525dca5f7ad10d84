//! `[base]` section configuration.
//!
//! Site-wide metadata shown in the page shell.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in syncsite.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "Mowebev"
/// description = "Walks, beaches and boats"
/// locale = "en-US"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Site title, shown in the header and appended to page titles.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// Fallback meta description for entries without one.
    #[serde(default)]
    pub description: String,

    /// Locale key used to read every entry field (e.g. "en-US").
    /// Also written as the document `lang`.
    #[serde(default = "defaults::base::locale")]
    #[educe(Default = defaults::base::locale())]
    pub locale: String,

    /// Copyright notice for the site footer.
    #[serde(default)]
    pub copyright: String,
}
