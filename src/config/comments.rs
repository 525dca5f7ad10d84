//! `[comments]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[comments]` section in syncsite.toml - the comment form and endpoint.
///
/// # Example
/// ```toml
/// [comments]
/// enable = true
/// endpoint = "/api/comments"
/// max_length = 2000
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CommentsConfig {
    /// Render the submission form under each post.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Path the form posts to, answered by `syncsite serve`.
    #[serde(default = "defaults::comments::endpoint")]
    #[educe(Default = defaults::comments::endpoint())]
    pub endpoint: String,

    /// Maximum comment length in characters, after sanitizing.
    #[serde(default = "defaults::comments::max_length")]
    #[educe(Default = defaults::comments::max_length())]
    pub max_length: usize,

    /// Maximum accepted request body in bytes.
    #[serde(default = "defaults::comments::max_body")]
    #[educe(Default = defaults::comments::max_body())]
    pub max_body: usize,
}
