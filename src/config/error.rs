//! Configuration error types.

use super::content::Credentials;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    /// Required credentials still unset after merging file and environment.
    #[error("missing content credentials: {} (resolved so far: {partial:?})", .missing.join(", "))]
    MissingCredentials {
        missing: Vec<&'static str>,
        partial: Credentials,
    },

    #[error("Config validation error: {0}")]
    Validation(String),
}
