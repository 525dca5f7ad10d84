//! HTTP client for the content delivery (and preview) API.

use super::{ContentSource, EntryCollection, FetchError, FetchResult, types::{Asset, Entry}};
use crate::{config::ContentConfig, log, state::SyncToken};
use reqwest::blocking::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use std::{collections::HashSet, time::Duration};

/// Page size for content-type queries (the API caps it at 1000).
const PAGE_LIMIT: usize = 100;

/// Link depth for content-type queries: post → comments/tags/hero image.
const INCLUDE_DEPTH: u8 = 2;

/// Blocking client bound to one space and environment.
pub struct DeliveryClient {
    http: Client,
    /// `{api}/spaces/{space}/environments/{environment}`
    base_url: String,
    token: String,
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncPage {
    items: Vec<Value>,
    next_page_url: Option<String>,
    next_sync_url: Option<String>,
}

#[derive(Deserialize)]
struct EntriesPage {
    items: Vec<Entry>,
    #[serde(default)]
    includes: Includes,
    total: usize,
    skip: usize,
}

#[derive(Default, Deserialize)]
struct Includes {
    #[serde(rename = "Entry", default)]
    entries: Vec<Entry>,
    #[serde(rename = "Asset", default)]
    assets: Vec<Asset>,
}

impl DeliveryClient {
    pub fn new(config: &ContentConfig) -> Result<Self, FetchError> {
        let (api_url, token) = config.read_endpoint();

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("syncsite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/spaces/{}/environments/{}",
                api_url.trim_end_matches('/'),
                config.space_id(),
                config.environment
            ),
            token: token.to_owned(),
        })
    }

    /// Authenticated GET, decoded as JSON.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .map_err(|source| FetchError::Http {
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

impl ContentSource for DeliveryClient {
    fn sync(&self, token: Option<&SyncToken>) -> Result<FetchResult, FetchError> {
        let mut query = match token {
            None => vec![("initial", "true".to_owned())],
            Some(token) => vec![("sync_token", token.as_str().to_owned())],
        };

        let mut result = FetchResult::default();
        let mut pages = 0usize;

        loop {
            let page: SyncPage = self.get_json("/sync", &query)?;
            pages += 1;
            absorb_items(&mut result, page.items)?;

            // Follow paging and the final sync url by token only; the host
            // and path stay ours.
            match (page.next_page_url, page.next_sync_url) {
                (Some(next), _) => query = vec![("sync_token", token_from_url(&next)?)],
                (None, Some(next)) => {
                    result.next_token = Some(SyncToken::new(token_from_url(&next)?));
                    break;
                }
                (None, None) => {
                    return Err(FetchError::Protocol(
                        "sync response has neither nextPageUrl nor nextSyncUrl".into(),
                    ));
                }
            }
        }

        log!("fetch"; "sync: {} page(s), {} entries, {} assets, {} deletions",
            pages,
            result.entries.len(),
            result.assets.len(),
            result.deleted_entries.len() + result.deleted_assets.len()
        );
        Ok(result)
    }

    fn entries(&self, content_type: &str) -> Result<EntryCollection, FetchError> {
        let mut collection = EntryCollection::default();
        let mut seen_entries = HashSet::new();
        let mut seen_assets = HashSet::new();
        let mut skip = 0;

        loop {
            let query = [
                ("content_type", content_type.to_owned()),
                ("locale", "*".to_owned()),
                ("include", INCLUDE_DEPTH.to_string()),
                ("order", "sys.createdAt".to_owned()),
                ("limit", PAGE_LIMIT.to_string()),
                ("skip", skip.to_string()),
            ];
            let page: EntriesPage = self.get_json("/entries", &query)?;
            let fetched = page.items.len();

            collection.items.extend(page.items);
            collection.included_entries.extend(
                page.includes
                    .entries
                    .into_iter()
                    .filter(|e| seen_entries.insert(e.sys.id.clone())),
            );
            collection.included_assets.extend(
                page.includes
                    .assets
                    .into_iter()
                    .filter(|a| seen_assets.insert(a.sys.id.clone())),
            );

            skip = page.skip + fetched;
            if fetched == 0 || skip >= page.total {
                break;
            }
        }

        log!("fetch"; "{}: {} entries", content_type, collection.items.len());
        Ok(collection)
    }
}

/// Sort raw sync items into entries, assets and deletion markers.
fn absorb_items(result: &mut FetchResult, items: Vec<Value>) -> Result<(), FetchError> {
    for item in items {
        let sys_str = |key: &str| {
            item.get("sys")
                .and_then(|sys| sys.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let kind = sys_str("type").unwrap_or_default();
        let deleted_id = sys_str("id");
        let id = || {
            deleted_id
                .clone()
                .ok_or_else(|| FetchError::Protocol(format!("{kind} without sys.id")))
        };

        match kind.as_str() {
            "DeletedEntry" => result.deleted_entries.push(id()?),
            "DeletedAsset" => result.deleted_assets.push(id()?),
            "Entry" => result.entries.push(decode_item(item)?),
            "Asset" => result.assets.push(decode_item(item)?),
            other => log!("fetch"; "ignoring sync item of type `{}`", other),
        }
    }
    Ok(())
}

fn decode_item<T: DeserializeOwned>(item: Value) -> Result<T, FetchError> {
    serde_json::from_value(item).map_err(|source| FetchError::Decode {
        url: "sync item".into(),
        source,
    })
}

/// Pull the `sync_token` parameter out of a `nextPageUrl`/`nextSyncUrl`.
fn token_from_url(next: &str) -> Result<String, FetchError> {
    let url = url::Url::parse(next)
        .map_err(|e| FetchError::Protocol(format!("invalid sync url `{next}`: {e}")))?;

    url.query_pairs()
        .find(|(key, _)| key == "sync_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| FetchError::Protocol(format!("sync url `{next}` has no sync_token")))
}
