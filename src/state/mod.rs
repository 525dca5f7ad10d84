//! Sync state persisted between runs.
//!
//! Two files live in `[build.state_dir]`:
//!
//! | File           | Contents                                         |
//! |----------------|--------------------------------------------------|
//! | `sync.json`    | `{"nextSyncToken": "<opaque>", "feed": {...}}`   |
//! | `content.json` | every entry and asset seen so far, unresolved    |
//!
//! Reads never fail the pipeline: anything missing or unreadable turns the
//! next fetch into a full sync. So does a token recorded for another space,
//! environment or API (delivery vs. preview).

mod snapshot;

pub use snapshot::{ContentSnapshot, Superseded};

use crate::{
    config::{ContentConfig, SiteConfig},
    log,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Opaque continuation marker for delta syncs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncToken(String);

impl SyncToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SyncToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are long; the head is enough to tell them apart in logs.
        let head: String = self.0.chars().take(8).collect();
        write!(f, "SyncToken({head}…)")
    }
}

/// Reading or writing a state file failed.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot access `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("malformed state file `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("sync token in `{0}` is empty")]
    EmptyToken(PathBuf),
}

impl StateError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(_, err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// The content feed a sync token was issued for.
///
/// Tokens are only valid against the space, environment and API that
/// issued them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub space_id: String,
    pub environment: String,
    pub preview: bool,
}

impl Feed {
    pub fn of(content: &ContentConfig) -> Self {
        Self {
            space_id: content.space_id().to_owned(),
            environment: content.environment.clone(),
            preview: content.preview,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TokenFile {
    #[serde(rename = "nextSyncToken")]
    next_sync_token: SyncToken,
    /// Absent in files written before feeds were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feed: Option<Feed>,
}

/// File-backed store for the sync token and content snapshot.
///
/// Single process, single invocation; no locking.
pub struct StateStore {
    token_path: PathBuf,
    snapshot_path: PathBuf,
    /// When set, tokens recorded for any other feed are ignored.
    feed: Option<Feed>,
}

impl StateStore {
    pub fn new(token_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: token_path.into(),
            snapshot_path: snapshot_path.into(),
            feed: None,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.token_path(), config.snapshot_path()).with_feed(Feed::of(&config.content))
    }

    pub fn with_feed(mut self, feed: Feed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// The persisted token, or `None` (logged) when there is no usable one.
    pub fn read_token(&self) -> Option<SyncToken> {
        let file = read_json::<TokenFile>(&self.token_path).and_then(|file| {
            if file.next_sync_token.as_str().trim().is_empty() {
                Err(StateError::EmptyToken(self.token_path.clone()))
            } else {
                Ok(file)
            }
        });
        let file = recover("sync token", file)?;
        if self.feed.is_some() && file.feed != self.feed {
            log!(
                "state";
                "sync token in `{}` belongs to another feed, starting over",
                self.token_path.display()
            );
            return None;
        }
        Some(file.next_sync_token)
    }

    /// Overwrite the persisted token, recording the feed it belongs to.
    pub fn write_token(&self, token: &SyncToken) -> Result<(), StateError> {
        let file = TokenFile {
            next_sync_token: token.clone(),
            feed: self.feed.clone(),
        };
        write_json(&self.token_path, &file)
    }

    /// The persisted snapshot, or `None` (logged) when it can't be read.
    pub fn read_snapshot(&self) -> Option<ContentSnapshot> {
        recover("content snapshot", read_json(&self.snapshot_path))
    }

    pub fn write_snapshot(&self, snapshot: &ContentSnapshot) -> Result<(), StateError> {
        write_json(&self.snapshot_path, snapshot)
    }
}

/// Turn a read failure into `None`, logging anything but a missing file.
fn recover<T>(what: &str, result: Result<T, StateError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_not_found() => {
            log!("state"; "no {} yet", what);
            None
        }
        Err(err) => {
            log!("warn"; "ignoring {}: {}", what, err);
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StateError> {
    let text = fs::read_to_string(path).map_err(|e| StateError::Io(path.to_path_buf(), e))?;
    serde_json::from_str(&text).map_err(|e| StateError::Json(path.to_path_buf(), e))
}

/// Write via a sibling temp file so a crash never leaves half a file behind.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StateError::Io(parent.to_path_buf(), e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| StateError::Json(path.to_path_buf(), e))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StateError::Io(tmp.clone(), e))?;
    fs::rename(&tmp, path).map_err(|e| StateError::Io(path.to_path_buf(), e))
}
