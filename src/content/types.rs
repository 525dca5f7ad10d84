//! Entry and asset records as the CMS serves them.
//!
//! Field values are locale-keyed: `fields.title["en-US"]`. Links between
//! records travel as `{"sys": {"type": "Link", "linkType": "Entry", "id": ..}}`
//! and are replaced by the embedded target during resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Locale → value for a single field.
pub type Localized = BTreeMap<String, Value>;

/// Field name → localized value. Ordered so snapshots serialize stably.
pub type Fields = BTreeMap<String, Localized>;

/// System metadata shared by entries, assets and deletion markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    #[serde(rename = "type")]
    pub kind: String,

    pub id: String,

    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,

    /// Management API version, required for updates and publishing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// A reference to another record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSys {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(rename = "linkType")]
    pub link_type: String,

    pub id: String,
}

impl Link {
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: "Link".into(),
                link_type: "Entry".into(),
                id: id.into(),
            },
        }
    }

    /// Parse a field value as a link, if it is one.
    pub fn from_value(value: &Value) -> Option<Self> {
        let sys = value.get("sys")?;
        if sys.get("type")?.as_str()? != "Link" {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// A structured content record of one content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Fields,
}

/// A media record (images and files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Fields,
}

impl Entry {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    /// Content type id (`page`, `post`, `comment`, ...); empty if absent.
    pub fn content_type_id(&self) -> &str {
        self.sys
            .content_type
            .as_ref()
            .map_or("", |link| link.sys.id.as_str())
    }

    pub fn field(&self, name: &str, locale: &str) -> Option<&Value> {
        self.fields.get(name)?.get(locale)
    }

    /// A string field, ignoring blank values.
    pub fn text(&self, name: &str, locale: &str) -> Option<&str> {
        self.field(name, locale)?
            .as_str()
            .filter(|s| !s.trim().is_empty())
    }

    /// Embedded entries of a reference-list field.
    ///
    /// Elements that are still bare links are skipped.
    pub fn linked_entries(&self, name: &str, locale: &str) -> Vec<Entry> {
        self.field(name, locale)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| sys_kind(item) == Some("Entry"))
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Embedded asset of a single-reference field.
    pub fn linked_asset(&self, name: &str, locale: &str) -> Option<Asset> {
        let value = self.field(name, locale)?;
        if sys_kind(value) != Some("Asset") {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Every link this entry holds, across all fields and locales.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for value in self.fields.values().flat_map(BTreeMap::values) {
            match value {
                Value::Array(items) => links.extend(items.iter().filter_map(Link::from_value)),
                other => links.extend(Link::from_value(other)),
            }
        }
        links
    }
}

impl Asset {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn title(&self, locale: &str) -> Option<&str> {
        self.fields.get("title")?.get(locale)?.as_str()
    }

    /// Absolute file URL; the CMS hands out protocol-relative ones.
    pub fn url(&self, locale: &str) -> Option<String> {
        let url = self.fields.get("file")?.get(locale)?.get("url")?.as_str()?;
        Some(match url.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => url.to_owned(),
        })
    }
}

fn sys_kind(value: &Value) -> Option<&str> {
    value.get("sys")?.get("type")?.as_str()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by tests across modules.

    use super::*;
    use serde_json::json;

    pub const LOCALE: &str = "en-US";

    pub fn entry(id: &str, content_type: &str, fields: Value) -> Entry {
        serde_json::from_value(json!({
            "sys": {
                "type": "Entry",
                "id": id,
                "contentType": { "sys": { "type": "Link", "linkType": "ContentType", "id": content_type } }
            },
            "fields": localize(fields),
        }))
        .unwrap()
    }

    pub fn asset(id: &str, title: &str, url: &str) -> Asset {
        serde_json::from_value(json!({
            "sys": { "type": "Asset", "id": id },
            "fields": localize(json!({ "title": title, "file": { "url": url } })),
        }))
        .unwrap()
    }

    pub fn entry_link(id: &str) -> Value {
        json!({ "sys": { "type": "Link", "linkType": "Entry", "id": id } })
    }

    pub fn asset_link(id: &str) -> Value {
        json!({ "sys": { "type": "Link", "linkType": "Asset", "id": id } })
    }

    /// Wrap every field value under the test locale.
    pub fn localize(fields: Value) -> Value {
        let map = fields
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), json!({ LOCALE: value })))
                    .collect::<serde_json::Map<_, _>>()
            })
            .unwrap_or_default();
        Value::Object(map)
    }
}
