//! Site configuration management for `syncsite.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                         |
//! |--------------|-------------------------------------------------|
//! | `[base]`     | Site metadata (title, description, locale)      |
//! | `[build]`    | Output root, sync state location, fetch mode    |
//! | `[content]`  | CMS credentials and API endpoints               |
//! | `[comments]` | Comment form and submission endpoint            |
//! | `[serve]`    | HTTP server (interface, port)                   |
//!
//! # Resolution order
//!
//! Built-in defaults, then the (optional) config file, then CLI flags, then
//! `CONTENT_*` environment variables (see [`SiteConfig::load`]). Flags and
//! variables never set the same key: flags cover paths, build and serve
//! options, variables cover credentials only. Credentials are validated last.
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Mowebev"
//! locale = "en-US"
//!
//! [build]
//! output = "public"
//!
//! [content]
//! spaceId = "abc123"
//! contentDeliveryAccessToken = "..."
//! contentPreviewAccessToken = "..."
//! ```

mod base;
mod build;
mod comments;
mod content;
pub mod defaults;
mod error;
mod serve;

pub use build::FetchMode;
pub use content::{ContentConfig, Credentials};
pub use error::ConfigError;

use base::BaseConfig;
use build::BuildConfig;
use comments::CommentsConfig;
use serve::ServeConfig;

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing syncsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// CMS credentials and endpoints
    #[serde(default)]
    pub content: ContentConfig,

    /// Comment form settings
    #[serde(default)]
    pub comments: CommentsConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load the config file if present, falling back to defaults.
    ///
    /// A missing file is not an error: every credential can come from the
    /// environment. A file that exists but doesn't parse is.
    pub fn from_path_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::from_path(path)
        } else {
            log!("config"; "no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Path of the persisted sync token
    pub fn token_path(&self) -> PathBuf {
        self.build.state_dir.join("sync.json")
    }

    /// Path of the persisted content snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.build.state_dir.join("content.json")
    }

    /// Resolve the config for `cli`, reading `CONTENT_*` variables through `env`.
    pub fn load(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let mut config = Self::from_path_or_default(&root.join(&cli.config))?;
        config.update_with_cli(cli);
        config.update_with_env(env);

        if !cli.is_init() {
            config.validate()?;
        }
        Ok(config)
    }

    /// Overlay `CONTENT_*` environment variables onto the credentials.
    pub fn update_with_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.content.apply_env(lookup);
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Some(build_args) = cli.build_args() {
            Self::update_option(&mut self.build.minify, build_args.minify.as_ref());
            if build_args.preview {
                self.content.preview = true;
            }
        }

        if let Commands::Serve {
            interface, port, ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Make every path absolute relative to `root`.
    fn update_path_with_root(&mut self, root: &Path, config_file: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_file));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));

        let state_dir = self.build.state_dir.to_string_lossy().into_owned();
        let state_dir = PathBuf::from(shellexpand::tilde(&state_dir).into_owned());
        self.build.state_dir = if state_dir.is_relative() {
            Self::normalize_path(&root.join(state_dir))
        } else {
            Self::normalize_path(&state_dir)
        };
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for a command that talks to the CMS.
    pub fn validate(&self) -> Result<()> {
        self.content.require_credentials()?;

        if self.base.locale.trim().is_empty() {
            bail!(ConfigError::Validation("[base.locale] must not be empty".into()));
        }

        for (field, url) in [
            ("[content.delivery_url]", &self.content.delivery_url),
            ("[content.preview_url]", &self.content.preview_url),
            ("[content.management_url]", &self.content.management_url),
        ] {
            if !url.starts_with("http") {
                bail!(ConfigError::Validation(format!(
                    "{field} must start with http:// or https://"
                )));
            }
        }

        if !self.comments.endpoint.starts_with('/') {
            bail!(ConfigError::Validation(
                "[comments.endpoint] must be an absolute path like /api/comments".into()
            ));
        }

        if self.build.state_dir.starts_with(&self.build.output) {
            bail!(ConfigError::Validation(
                "[build.state_dir] must not be inside [build.output], which is wiped on full syncs"
                    .into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn valid_config() -> SiteConfig {
        SiteConfig::from_str(
            r#"
            [content]
            spaceId = "space"
            contentDeliveryAccessToken = "delivery"
            contentPreviewAccessToken = "preview"
        "#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[base\ntitle = 1");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_from_path_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::from_path_or_default(&dir.path().join("nope.toml")).unwrap();

        assert!(config.content.space_id.is_none());
        assert_eq!(config.base.locale, "en-US");
    }

    #[test]
    fn test_from_path_or_default_broken_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syncsite.toml");
        fs::write(&path, "[content]\nspaceId = ").unwrap();

        assert!(SiteConfig::from_path_or_default(&path).is_err());
    }

    #[test]
    fn test_state_paths() {
        let config = SiteConfig::default();
        assert_eq!(config.token_path(), PathBuf::from(".syncsite/sync.json"));
        assert_eq!(config.snapshot_path(), PathBuf::from(".syncsite/content.json"));
    }

    #[test]
    fn test_update_with_cli_paths_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from([
            "syncsite", "--root", root, "--output", "dist", "build", "--preview", "--minify",
        ]);

        let mut config = valid_config();
        config.update_with_cli(&cli);

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.get_root(), root.as_path());
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.build.state_dir, root.join(".syncsite"));
        assert_eq!(config.config_path, root.join("syncsite.toml"));
        assert!(config.content.preview);
        assert!(config.build.minify);
    }

    #[test]
    fn test_update_with_cli_serve_overrides() {
        let cli = Cli::parse_from(["syncsite", "serve", "--port", "9000"]);
        let mut config = valid_config();
        config.update_with_cli(&cli);

        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.serve.interface, "127.0.0.1");
    }

    #[test]
    fn test_load_layers_file_cli_env() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("syncsite.toml"),
            r#"
            [build]
            minify = false

            [content]
            spaceId = "file-space"
            contentDeliveryAccessToken = "file-delivery"
            contentPreviewAccessToken = "file-preview"
            "#,
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["syncsite", "--root", root, "build", "--minify", "--preview"]);

        let config = SiteConfig::load(&cli, |key| {
            (key == "CONTENT_PREVIEW_ACCESS_TOKEN").then(|| "env-preview".to_owned())
        })
        .unwrap();

        assert!(config.build.minify);
        assert!(config.content.preview);
        assert_eq!(config.content.space_id(), "file-space");
        assert_eq!(config.content.read_endpoint().1, "env-preview");
    }

    #[test]
    fn test_load_validates_except_for_init() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let no_env = |_: &str| -> Option<String> { None };

        let build = Cli::parse_from(["syncsite", "--root", root, "build"]);
        assert!(SiteConfig::load(&build, no_env).is_err());

        let init = Cli::parse_from(["syncsite", "--root", root, "init"]);
        assert!(SiteConfig::load(&init, no_env).is_ok());
    }

    #[test]
    fn test_validate_ok() {
        let mut config = valid_config();
        config.build.output = PathBuf::from("/site/public");
        config.build.state_dir = PathBuf::from("/site/.syncsite");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_credentials() {
        let err = SiteConfig::default().validate().unwrap_err();
        let err = err.downcast::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::MissingCredentials { ref missing, .. } if missing.len() == 3));
    }

    #[test]
    fn test_validate_bad_url() {
        let mut config = valid_config();
        config.content.delivery_url = "cdn.example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_state_inside_output() {
        let mut config = valid_config();
        config.build.output = PathBuf::from("/site/public");
        config.build.state_dir = PathBuf::from("/site/public/.state");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = SiteConfig::from_str("[deploy]\nprovider = \"github\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_round_trips_as_toml() {
        let text = toml::to_string_pretty(&SiteConfig::default()).unwrap();
        let parsed = SiteConfig::from_str(&text).unwrap();
        assert_eq!(parsed.base.title, "My Site");
        assert_eq!(parsed.serve.port, 5277);
    }
}
