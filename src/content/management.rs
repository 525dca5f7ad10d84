//! Content management API client, used by the comment endpoint.
//!
//! Holds the write token server-side. Adding a comment is a six-call
//! sequence: load the post, create the comment, publish it, append the
//! link, save the post, publish the post. Nothing is created until the
//! target is known to be a post.

use super::{FetchError, types::{Entry, Link}};
use crate::config::{ContentConfig, SiteConfig};
use reqwest::{Method, blocking::{Client, RequestBuilder}};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

const CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Content type id of comment entries.
pub const COMMENT_TYPE: &str = "comment";

/// Content type id comments may be attached to.
const POST_TYPE: &str = "post";

pub struct ManagementClient {
    http: Client,
    /// `{api}/spaces/{space}/environments/{environment}`
    base_url: String,
    token: String,
    locale: String,
}

impl ManagementClient {
    /// `None` when no management token is configured.
    pub fn from_config(config: &SiteConfig) -> Result<Option<Self>, FetchError> {
        let content: &ContentConfig = &config.content;
        let Some(token) = content.management_token.clone() else {
            return Ok(None);
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(content.timeout_secs))
            .user_agent(concat!("syncsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Some(Self {
            http,
            base_url: format!(
                "{}/spaces/{}/environments/{}",
                content.management_url.trim_end_matches('/'),
                content.space_id(),
                content.environment
            ),
            token,
            locale: config.base.locale.clone(),
        }))
    }

    /// Create and publish a comment, then attach it to `post_id` and republish.
    ///
    /// Returns the new comment's id.
    pub fn add_comment(&self, post_id: &str, text: &str) -> Result<String, FetchError> {
        let mut post = self.get_entry(post_id)?;
        if post.content_type_id() != POST_TYPE {
            return Err(FetchError::WrongType {
                id: post_id.to_owned(),
                expected: POST_TYPE,
                found: post.content_type_id().to_owned(),
            });
        }

        let comment = self.create_comment(text)?;
        self.publish(&comment)?;

        append_link(&mut post, "comments", &self.locale, comment.id());
        let post = self.update(&post)?;
        self.publish(&post)?;

        Ok(comment.sys.id)
    }

    fn create_comment(&self, text: &str) -> Result<Entry, FetchError> {
        let body = json!({ "fields": { "comment": { &self.locale: text } } });
        let request = self
            .request(Method::POST, "/entries")
            .header("X-Contentful-Content-Type", COMMENT_TYPE)
            .json(&body);
        self.send("/entries", request)
    }

    fn get_entry(&self, id: &str) -> Result<Entry, FetchError> {
        let path = format!("/entries/{id}");
        self.send(&path, self.request(Method::GET, &path))
    }

    fn update(&self, entry: &Entry) -> Result<Entry, FetchError> {
        let path = format!("/entries/{}", entry.id());
        let request = self
            .request(Method::PUT, &path)
            .header("X-Contentful-Version", version(entry)?)
            .json(&json!({ "fields": entry.fields }));
        self.send(&path, request)
    }

    fn publish(&self, entry: &Entry) -> Result<Entry, FetchError> {
        let path = format!("/entries/{}/published", entry.id());
        let request = self
            .request(Method::PUT, &path)
            .header("X-Contentful-Version", version(entry)?);
        self.send(&path, request)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
    }

    fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = request.send().map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let text = response.text().map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(FetchError::status(&url, status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|source| FetchError::Decode { url, source })
    }
}

fn version(entry: &Entry) -> Result<String, FetchError> {
    entry
        .sys
        .version
        .map(|v| v.to_string())
        .ok_or_else(|| FetchError::Protocol(format!("entry `{}` has no sys.version", entry.id())))
}

/// Push an entry link onto a reference-list field, creating it if needed.
fn append_link(entry: &mut Entry, field: &str, locale: &str, id: &str) {
    let link = serde_json::to_value(Link::entry(id)).unwrap_or(Value::Null);
    let slot = entry
        .fields
        .entry(field.to_owned())
        .or_default()
        .entry(locale.to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));

    match slot {
        Value::Array(items) => items.push(link),
        other => *other = Value::Array(vec![link]),
    }
}
