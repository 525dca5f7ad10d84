//! Accumulated content across syncs.
//!
//! A delta sync only carries what changed, but rendering a post needs the
//! comments, tags and images it links to, and the blog index needs every
//! post. The snapshot keeps all of it, keyed by id, exactly as fetched
//! (links unresolved), plus the ids of everything deleted since the last
//! full sync so stale links to them can be dropped.

use crate::content::{
    Asset, Entry, EntryCollection, FetchResult,
    resolve::Lookup,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Entry versions a delta replaced.
#[derive(Debug, Default)]
pub struct Superseded {
    /// Last known version of every deleted entry.
    pub deleted: Vec<Entry>,
    /// Previous version of every entry the delta changed.
    pub updated: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    #[serde(default)]
    entries: BTreeMap<String, Entry>,
    #[serde(default)]
    assets: BTreeMap<String, Asset>,
    #[serde(default)]
    tombstones: BTreeSet<String>,
}

impl ContentSnapshot {
    /// Snapshot of a full sync.
    pub fn from_fetch(result: &FetchResult) -> Self {
        let mut snapshot = Self::default();
        snapshot.apply(result);
        snapshot
    }

    /// Snapshot of content-type queries, including linked records.
    pub fn from_collections(collections: &[EntryCollection]) -> Self {
        let mut snapshot = Self::default();
        for collection in collections {
            for entry in collection.items.iter().chain(&collection.included_entries) {
                snapshot.entries.insert(entry.sys.id.clone(), entry.clone());
            }
            for asset in &collection.included_assets {
                snapshot.assets.insert(asset.sys.id.clone(), asset.clone());
            }
        }
        snapshot
    }

    /// Merge a delta: upsert changed records, drop deleted ones.
    ///
    /// Returns the versions the delta replaced, so callers can find the
    /// files rendered from them.
    pub fn apply(&mut self, result: &FetchResult) -> Superseded {
        let mut superseded = Superseded::default();
        for entry in &result.entries {
            self.tombstones.remove(&entry.sys.id);
            if let Some(old) = self.entries.insert(entry.sys.id.clone(), entry.clone()) {
                superseded.updated.push(old);
            }
        }
        for asset in &result.assets {
            self.tombstones.remove(&asset.sys.id);
            self.assets.insert(asset.sys.id.clone(), asset.clone());
        }
        for id in &result.deleted_assets {
            self.assets.remove(id);
            self.tombstones.insert(id.clone());
        }
        self.tombstones.extend(result.deleted_entries.iter().cloned());
        superseded.deleted = result
            .deleted_entries
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect();
        superseded
    }

    /// Entries of one content type, in id order.
    pub fn entries_of<'a>(&'a self, content_type: &'a str) -> impl Iterator<Item = &'a Entry> {
        self.entries
            .values()
            .filter(move |entry| entry.content_type_id() == content_type)
    }

    /// Entries holding a link to any of `changed`.
    ///
    /// A new comment only shows up once its post is re-rendered; this finds
    /// the post even if the post itself didn't change.
    pub fn dependents_of(&self, changed: &HashSet<&str>) -> Vec<&Entry> {
        self.entries
            .values()
            .filter(|entry| {
                entry
                    .links()
                    .iter()
                    .any(|link| changed.contains(link.sys.id.as_str()))
            })
            .collect()
    }

    /// Ids deleted by any delta applied so far.
    pub fn tombstones(&self) -> HashSet<String> {
        self.tombstones.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Lookup for ContentSnapshot {
    fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }
}
