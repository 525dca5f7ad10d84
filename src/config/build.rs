//! `[build]` section configuration.
//!
//! Output paths, sync state location, and how content is fetched.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How content is pulled from the delivery API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Sync API: full on first run, deltas afterwards (default).
    #[default]
    Sync,
    /// Query `page` and `post` entries by content type. Always a full build.
    Query,
}

/// `[build]` section in syncsite.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// output = "public"       # Rendered site
/// state_dir = ".syncsite" # Sync token and content snapshot
/// minify = false
/// fetch_mode = "sync"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(skip)]
    pub root: Option<PathBuf>,

    /// Output root. Emptied on every full sync.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Directory holding `sync.json` and `content.json`.
    /// Must live outside `output`, which is wiped on full syncs.
    #[serde(default = "defaults::build::state_dir")]
    #[educe(Default = defaults::build::state_dir())]
    pub state_dir: PathBuf,

    /// Minify rendered HTML.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    #[serde(default = "defaults::build::fetch_mode")]
    #[educe(Default = defaults::build::fetch_mode())]
    pub fetch_mode: FetchMode,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.state_dir, PathBuf::from(".syncsite"));
        assert!(!config.build.minify);
        assert_eq!(config.build.fetch_mode, FetchMode::Sync);
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            output = "dist"
            state_dir = "~/.cache/site"
            minify = true
            fetch_mode = "query"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.state_dir, PathBuf::from("~/.cache/site"));
        assert!(config.build.minify);
        assert_eq!(config.build.fetch_mode, FetchMode::Query);
    }

    #[test]
    fn test_invalid_fetch_mode() {
        let config = r#"
            [build]
            fetch_mode = "graphql"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
