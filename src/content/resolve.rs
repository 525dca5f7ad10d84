//! One-hop link resolution.
//!
//! Replaces every link in an entry's fields with the record it points to,
//! so templates never see a bare `{"sys": {"type": "Link"}}`. Embedded
//! records keep their own links unresolved.

use super::{FetchError, types::{Asset, Entry, Link}};
use crate::log;
use serde_json::Value;
use std::collections::HashSet;

/// Where link targets are looked up.
pub trait Lookup {
    fn entry(&self, id: &str) -> Option<&Entry>;
    fn asset(&self, id: &str) -> Option<&Asset>;
}

/// Resolve all links of `entry` against `lookup`.
///
/// Links to ids in `deleted` (removed in the same delta) are dropped from
/// lists and cleared from single-reference fields. Any other unknown target
/// is an error.
pub fn resolve_entry(
    entry: &Entry,
    lookup: &impl Lookup,
    deleted: &HashSet<String>,
) -> Result<Entry, FetchError> {
    let mut resolved = entry.clone();

    for localized in resolved.fields.values_mut() {
        for value in localized.values_mut() {
            match value {
                Value::Array(items) => {
                    let mut kept = Vec::with_capacity(items.len());
                    for item in items.drain(..) {
                        if let Some(item) = resolve_value(entry.id(), item, lookup, deleted)? {
                            kept.push(item);
                        }
                    }
                    *items = kept;
                }
                single => {
                    let taken = std::mem::take(single);
                    *single = resolve_value(entry.id(), taken, lookup, deleted)?.unwrap_or(Value::Null);
                }
            }
        }
    }

    Ok(resolved)
}

/// Embed a single value's link target; non-links pass through.
fn resolve_value(
    from: &str,
    value: Value,
    lookup: &impl Lookup,
    deleted: &HashSet<String>,
) -> Result<Option<Value>, FetchError> {
    let Some(link) = Link::from_value(&value) else {
        return Ok(Some(value));
    };
    let id = link.sys.id.as_str();

    let target = match link.sys.link_type.as_str() {
        "Entry" => lookup.entry(id).map(serde_json::to_value),
        "Asset" => lookup.asset(id).map(serde_json::to_value),
        // Space, ContentType, ... links carry no content.
        _ => return Ok(Some(value)),
    };

    match target {
        Some(embedded) => embedded.map(Some).map_err(|source| FetchError::Decode {
            url: format!("{} `{}`", link.sys.link_type, id),
            source,
        }),
        None if deleted.contains(id) => {
            log!("fetch"; "{} drops link to deleted {} `{}`", from, link.sys.link_type, id);
            Ok(None)
        }
        None => Err(FetchError::UnresolvedLink {
            from: from.to_owned(),
            link_type: link.sys.link_type,
            id: id.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::types::fixtures::{LOCALE, asset, asset_link, entry, entry_link};
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Records {
        entries: HashMap<String, Entry>,
        assets: HashMap<String, Asset>,
    }

    impl Lookup for Records {
        fn entry(&self, id: &str) -> Option<&Entry> {
            self.entries.get(id)
        }
        fn asset(&self, id: &str) -> Option<&Asset> {
            self.assets.get(id)
        }
    }

    fn records() -> Records {
        let mut records = Records::default();
        for e in [
            entry("c1", "comment", json!({ "comment": "nice" })),
            entry("c2", "comment", json!({ "comment": "lovely" })),
            entry("t1", "tag", json!({ "title": "Sailing" })),
        ] {
            records.entries.insert(e.id().to_owned(), e);
        }
        let image = asset("img", "Boat", "//img/boat.jpg");
        records.assets.insert(image.id().to_owned(), image);
        records
    }

    fn post(fields: serde_json::Value) -> Entry {
        entry("trip", "post", fields)
    }

    #[test]
    fn test_resolves_lists_and_single_links() {
        let post = post(json!({
            "title": "Trip",
            "comments": [entry_link("c1"), entry_link("c2")],
            "tags": [entry_link("t1")],
            "heroImage": asset_link("img"),
        }));

        let resolved = resolve_entry(&post, &records(), &HashSet::new()).unwrap();

        let comments: Vec<_> = resolved
            .linked_entries("comments", LOCALE)
            .iter()
            .map(|c| c.text("comment", LOCALE).unwrap().to_owned())
            .collect();
        assert_eq!(comments, vec!["nice", "lovely"]);
        assert_eq!(resolved.linked_entries("tags", LOCALE).len(), 1);
        assert_eq!(
            resolved.linked_asset("heroImage", LOCALE).unwrap().title(LOCALE),
            Some("Boat")
        );
        assert_eq!(resolved.text("title", LOCALE), Some("Trip"));
        assert!(resolved.links().is_empty());
    }

    #[test]
    fn test_missing_target_is_fetch_error() {
        let post = post(json!({ "comments": [entry_link("c1"), entry_link("ghost")] }));

        match resolve_entry(&post, &records(), &HashSet::new()) {
            Err(FetchError::UnresolvedLink { from, link_type, id }) => {
                assert_eq!(from, "trip");
                assert_eq!(link_type, "Entry");
                assert_eq!(id, "ghost");
            }
            other => panic!("expected UnresolvedLink, got {other:?}"),
        }
    }

    #[test]
    fn test_links_to_deleted_records_are_dropped() {
        let post = post(json!({
            "comments": [entry_link("c1"), entry_link("gone")],
            "heroImage": asset_link("gone-img"),
        }));
        let deleted = HashSet::from(["gone".to_string(), "gone-img".to_string()]);

        let resolved = resolve_entry(&post, &records(), &deleted).unwrap();

        assert_eq!(resolved.linked_entries("comments", LOCALE).len(), 1);
        assert_eq!(resolved.field("heroImage", LOCALE), Some(&Value::Null));
    }

    #[test]
    fn test_one_hop_only() {
        let mut records = records();
        let nested = entry("c3", "comment", json!({ "author": entry_link("someone") }));
        records.entries.insert("c3".into(), nested);

        let post = post(json!({ "comments": [entry_link("c3")] }));
        let resolved = resolve_entry(&post, &records, &HashSet::new()).unwrap();

        let comment = &resolved.linked_entries("comments", LOCALE)[0];
        assert_eq!(comment.links().len(), 1);
    }
}
