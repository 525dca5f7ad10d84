//! `[content]` section configuration.
//!
//! Credentials and endpoints for the headless CMS. Credential keys use the
//! CMS's own naming (`spaceId`, `contentDeliveryAccessToken`, ...) so an
//! exported config can be pasted as-is.

use super::{defaults, error::ConfigError};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variables overriding the file values, in resolution order.
pub const ENV_SPACE_ID: &str = "CONTENT_SPACE_ID";
pub const ENV_DELIVERY_TOKEN: &str = "CONTENT_DELIVERY_ACCESS_TOKEN";
pub const ENV_PREVIEW_TOKEN: &str = "CONTENT_PREVIEW_ACCESS_TOKEN";
pub const ENV_MANAGEMENT_TOKEN: &str = "CONTENT_MANAGEMENT_ACCESS_TOKEN";

/// `[content]` section in syncsite.toml.
///
/// # Example
/// ```toml
/// [content]
/// spaceId = "abc123"
/// contentDeliveryAccessToken = "..."
/// contentPreviewAccessToken = "..."
/// environment = "master"
/// preview = false
/// ```
#[derive(Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    #[serde(rename = "spaceId", default)]
    pub space_id: Option<String>,

    #[serde(rename = "contentDeliveryAccessToken", default)]
    pub delivery_token: Option<String>,

    #[serde(rename = "contentPreviewAccessToken", default)]
    pub preview_token: Option<String>,

    /// Write token for the comment endpoint. Only `serve` needs it.
    #[serde(rename = "contentManagementAccessToken", default)]
    pub management_token: Option<String>,

    #[serde(default = "defaults::content::environment")]
    #[educe(Default = defaults::content::environment())]
    pub environment: String,

    /// Read unpublished drafts through the preview API.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub preview: bool,

    #[serde(default = "defaults::content::delivery_url")]
    #[educe(Default = defaults::content::delivery_url())]
    pub delivery_url: String,

    #[serde(default = "defaults::content::preview_url")]
    #[educe(Default = defaults::content::preview_url())]
    pub preview_url: String,

    #[serde(default = "defaults::content::management_url")]
    #[educe(Default = defaults::content::management_url())]
    pub management_url: String,

    /// Per-request HTTP timeout.
    #[serde(default = "defaults::content::timeout_secs")]
    #[educe(Default = defaults::content::timeout_secs())]
    pub timeout_secs: u64,
}

/// The credential record, as resolved from file and environment.
///
/// `Debug` redacts token values so the record can be logged and embedded
/// in errors.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub space_id: Option<String>,
    pub delivery_token: Option<String>,
    pub preview_token: Option<String>,
    pub management_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(token: &Option<String>) -> &'static str {
            if token.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("space_id", &self.space_id)
            .field("delivery_token", &redact(&self.delivery_token))
            .field("preview_token", &redact(&self.preview_token))
            .field("management_token", &redact(&self.management_token))
            .finish()
    }
}

impl fmt::Debug for ContentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentConfig")
            .field("credentials", &self.credentials())
            .field("environment", &self.environment)
            .field("preview", &self.preview)
            .field("delivery_url", &self.delivery_url)
            .field("preview_url", &self.preview_url)
            .field("management_url", &self.management_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ContentConfig {
    /// Snapshot of the credential fields.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            space_id: self.space_id.clone(),
            delivery_token: self.delivery_token.clone(),
            preview_token: self.preview_token.clone(),
            management_token: self.management_token.clone(),
        }
    }

    /// Overlay credential values found through `lookup`.
    ///
    /// Set variables replace file values; unset or empty ones leave them alone.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        for (key, slot) in [
            (ENV_SPACE_ID, &mut self.space_id),
            (ENV_DELIVERY_TOKEN, &mut self.delivery_token),
            (ENV_PREVIEW_TOKEN, &mut self.preview_token),
            (ENV_MANAGEMENT_TOKEN, &mut self.management_token),
        ] {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }
    }

    /// Fail unless space id, delivery token and preview token are all set.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = [
            ("spaceId", &self.space_id),
            ("contentDeliveryAccessToken", &self.delivery_token),
            ("contentPreviewAccessToken", &self.preview_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials {
                missing,
                partial: self.credentials(),
            })
        }
    }

    pub fn space_id(&self) -> &str {
        self.space_id.as_deref().unwrap_or_default()
    }

    /// Base URL and token for reads, honoring `preview`.
    pub fn read_endpoint(&self) -> (&str, &str) {
        if self.preview {
            (&self.preview_url, self.preview_token.as_deref().unwrap_or_default())
        } else {
            (&self.delivery_url, self.delivery_token.as_deref().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn from_file() -> ContentConfig {
        let config = r#"
            [content]
            spaceId = "file-space"
            contentDeliveryAccessToken = "file-delivery"
            contentPreviewAccessToken = "file-preview"
        "#;
        toml::from_str::<SiteConfig>(config).unwrap().content
    }

    #[test]
    fn test_file_only() {
        let mut content = from_file();
        content.apply_env(env(&[]));

        assert!(content.require_credentials().is_ok());
        assert_eq!(content.space_id(), "file-space");
    }

    #[test]
    fn test_env_only() {
        let mut content = ContentConfig::default();
        content.apply_env(env(&[
            (ENV_SPACE_ID, "env-space"),
            (ENV_DELIVERY_TOKEN, "env-delivery"),
            (ENV_PREVIEW_TOKEN, "env-preview"),
        ]));

        assert!(content.require_credentials().is_ok());
        assert_eq!(content.space_id(), "env-space");
        assert_eq!(content.read_endpoint().1, "env-delivery");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut content = from_file();
        content.apply_env(env(&[(ENV_DELIVERY_TOKEN, "env-delivery")]));

        assert_eq!(content.delivery_token.as_deref(), Some("env-delivery"));
        assert_eq!(content.space_id(), "file-space");
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let mut content = from_file();
        content.apply_env(env(&[(ENV_SPACE_ID, "  ")]));

        assert_eq!(content.space_id(), "file-space");
    }

    #[test]
    fn test_each_missing_field_fails() {
        for key in [ENV_SPACE_ID, ENV_DELIVERY_TOKEN, ENV_PREVIEW_TOKEN] {
            let vars: Vec<(&str, &str)> = [
                (ENV_SPACE_ID, "s"),
                (ENV_DELIVERY_TOKEN, "d"),
                (ENV_PREVIEW_TOKEN, "p"),
            ]
            .into_iter()
            .filter(|(k, _)| *k != key)
            .collect();

            let mut content = ContentConfig::default();
            content.apply_env(env(&vars));

            match content.require_credentials() {
                Err(ConfigError::MissingCredentials { missing, .. }) => {
                    assert_eq!(missing.len(), 1, "only {key} should be missing")
                }
                other => panic!("expected MissingCredentials for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_management_token_is_optional() {
        let content = from_file();
        assert!(content.management_token.is_none());
        assert!(content.require_credentials().is_ok());
    }

    #[test]
    fn test_preview_endpoint() {
        let mut content = from_file();
        content.preview = true;

        let (url, token) = content.read_endpoint();
        assert_eq!(url, "https://preview.contentful.com");
        assert_eq!(token, "file-preview");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug = format!("{:?}", from_file());
        assert!(debug.contains("file-space"));
        assert!(!debug.contains("file-delivery"));
        assert!(!debug.contains("file-preview"));
    }
}
