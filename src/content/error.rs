//! Content API error types.

use thiserror::Error;

/// Longest response body kept in a [`FetchError::Status`].
const MAX_BODY_LEN: usize = 300;

/// Failures talking to the CMS, or making sense of what it returned.
///
/// All of them are fatal to a build: nothing is rendered from a partial fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("could not decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("entry `{from}` links to {link_type} `{id}`, which does not exist")]
    UnresolvedLink {
        from: String,
        link_type: String,
        id: String,
    },

    #[error("entry `{id}` is a `{found}`, expected a `{expected}`")]
    WrongType {
        id: String,
        expected: &'static str,
        found: String,
    },

    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl FetchError {
    /// The request named a record that doesn't exist or can't be used.
    pub fn is_bad_target(&self) -> bool {
        matches!(
            self,
            Self::WrongType { .. } | Self::Status { status: 404, .. }
        )
    }

    pub fn status(url: &str, status: u16, body: &str) -> Self {
        let mut end = body.len().min(MAX_BODY_LEN);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        Self::Status {
            url: url.to_owned(),
            status,
            body: body[..end].trim().to_owned(),
        }
    }
}
