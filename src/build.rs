//! Site building orchestration.
//!
//! ```text
//! build_site()
//!     │
//!     ├── fetch()        sync (full or delta) or content-type queries
//!     │                  → merged into the ContentSnapshot
//!     │
//!     ├── resolve        embed links of every entry about to be rendered
//!     │                  (fatal; nothing on disk has changed yet)
//!     │
//!     ├── persist        sync token + snapshot
//!     │
//!     ├── write          full: reset output, render everything
//!     │                  delta: remove files of deleted or moved entries,
//!     │                         render changed entries and their dependents
//!     │
//!     └── indexes        home page and blog index from the whole snapshot
//! ```
//!
//! Each output file has exactly one owner: the entry with the lowest id among
//! those rendering to it. Others are skipped with a warning.

use crate::{
    config::{FetchMode, SiteConfig},
    content::{
        ContentSource, Entry, FetchResult,
        resolve::{Lookup, resolve_entry},
    },
    log,
    logger::Progress,
    render::{
        self, BLOG_DIR, OutputFile, PAGE_TYPE, POST_TYPE, PageLink, PostSummary, RenderContext,
        render_blog_index, render_home, sort_posts,
    },
    site::SiteWriter,
    state::{ContentSnapshot, StateStore, Superseded, SyncToken},
    utils::minify::minify_html,
};
use anyhow::{Context, Result};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::PathBuf,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Output rebuilt from scratch.
    Full,
    /// Only changed entries re-rendered.
    Delta,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full => "full",
            Self::Delta => "delta",
        })
    }
}

/// What one run did to the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub mode: BuildMode,
    /// Files written, both indexes included.
    pub written: usize,
    /// Entries dropped because they failed to render or lost their path.
    pub skipped: usize,
    /// Files of deleted or moved entries removed.
    pub removed: usize,
}

/// Content fetched for this run, merged into the snapshot.
struct Fetched {
    mode: BuildMode,
    snapshot: ContentSnapshot,
    /// Ids to render, in source order.
    targets: Vec<String>,
    /// Files rendered by a previous run that no entry renders to anymore.
    stale: Vec<PathBuf>,
    next_token: Option<SyncToken>,
}

/// Fetch, render and write the site.
///
/// `force_full` ignores the stored sync token.
pub fn build_site(
    config: &SiteConfig,
    source: &impl ContentSource,
    store: &StateStore,
    force_full: bool,
) -> Result<BuildReport> {
    let ctx = RenderContext::from_config(config);
    let fetched = fetch(config, source, store, force_full)?;
    let Fetched {
        mode,
        snapshot,
        targets,
        stale,
        next_token,
    } = fetched;

    // Resolve everything up front: a dangling link aborts before any write.
    let tombstones = snapshot.tombstones();
    let mut resolved = Vec::with_capacity(targets.len());
    for id in &targets {
        let Some(entry) = snapshot.entry(id) else {
            continue;
        };
        if matches!(entry.content_type_id(), PAGE_TYPE | POST_TYPE) {
            resolved.push(resolve_entry(entry, &snapshot, &tombstones)?);
        }
    }

    if let Some(token) = &next_token {
        store.write_token(token).context("Failed to persist sync token")?;
        store
            .write_snapshot(&snapshot)
            .context("Failed to persist content snapshot")?;
    }

    let site = SiteWriter::new(&config.build.output);
    if mode == BuildMode::Full {
        site.reset()?;
    }
    site.ensure_dir(BLOG_DIR)?;

    let mut report = BuildReport {
        mode,
        written: 0,
        skipped: 0,
        removed: 0,
    };

    for path in &stale {
        site.remove(path)?;
        log!("build"; "removed {}", path.display());
        report.removed += 1;
    }

    let owners = path_owners(&snapshot, ctx.locale);
    let write = |file: &OutputFile| site.write(&file.path, &minify_html(&file.content, config.build.minify));

    let progress = Progress::new("render", resolved.len());
    for entry in &resolved {
        match render::render_entry(entry, &ctx) {
            Ok(Some(file)) => match owners.get(&file.path) {
                Some(owner) if *owner != entry.id() => {
                    log!(
                        "warn";
                        "skipping: `{}` renders to {}, already taken by `{}`",
                        entry.id(), file.path.display(), owner
                    );
                    report.skipped += 1;
                }
                _ => {
                    write(&file)?;
                    report.written += 1;
                }
            },
            Ok(None) => {}
            Err(err) => {
                log!("warn"; "skipping: {}", err);
                report.skipped += 1;
            }
        }
        progress.inc();
    }
    progress.finish();

    let mut posts: Vec<_> = snapshot
        .entries_of(POST_TYPE)
        .filter(|post| owns_path(&owners, post, ctx.locale))
        .filter_map(|post| PostSummary::from_entry(post, ctx.locale).ok())
        .collect();
    sort_posts(&mut posts);
    let pages: Vec<_> = snapshot
        .entries_of(PAGE_TYPE)
        .filter(|page| owns_path(&owners, page, ctx.locale))
        .filter_map(|page| PageLink::from_entry(page, ctx.locale).ok())
        .collect();

    for index in [render_home(&pages, &posts, &ctx), render_blog_index(&posts, &ctx)] {
        write(&index)?;
        report.written += 1;
    }

    log!(
        "build";
        "{} build: {} written, {} skipped, {} removed ({} entries known)",
        report.mode, report.written, report.skipped, report.removed, snapshot.len()
    );
    log_build_result(&site);
    Ok(report)
}

/// Warn when nothing but the two indexes exists in the output.
fn log_build_result(site: &SiteWriter) {
    if site.html_files().len() <= 2 {
        log!("warn"; "no pages in {}, check the `page` and `post` content types", site.root().display());
    } else {
        log!("build"; "done");
    }
}

/// Pull content and fold it into the snapshot.
fn fetch(
    config: &SiteConfig,
    source: &impl ContentSource,
    store: &StateStore,
    force_full: bool,
) -> Result<Fetched> {
    if config.build.fetch_mode == FetchMode::Query {
        let collections = [source.entries(PAGE_TYPE)?, source.entries(POST_TYPE)?];
        let targets = collections
            .iter()
            .flat_map(|c| c.items.iter().map(|e| e.id().to_owned()))
            .collect();
        return Ok(Fetched {
            mode: BuildMode::Full,
            snapshot: ContentSnapshot::from_collections(&collections),
            targets,
            stale: Vec::new(),
            next_token: None,
        });
    }

    let prior = if force_full {
        None
    } else {
        store.read_token().and_then(|token| match store.read_snapshot() {
            Some(snapshot) => Some((token, snapshot)),
            None => {
                log!("state"; "sync token without snapshot, falling back to full sync");
                None
            }
        })
    };

    match prior {
        None => {
            let result = source.sync(None)?;
            Ok(Fetched {
                mode: BuildMode::Full,
                snapshot: ContentSnapshot::from_fetch(&result),
                targets: result.entries.iter().map(|e| e.id().to_owned()).collect(),
                stale: Vec::new(),
                next_token: result.next_token,
            })
        }
        Some((token, mut snapshot)) => {
            let result = source.sync(Some(&token))?;
            let superseded = snapshot.apply(&result);
            let locale = config.base.locale.as_str();
            let stale = stale_paths(&snapshot, &superseded, locale);
            let targets = delta_targets(&snapshot, &result, &stale, locale);
            Ok(Fetched {
                mode: BuildMode::Delta,
                snapshot,
                targets,
                stale,
                next_token: result.next_token,
            })
        }
    }
}

/// Output paths of deleted entries, and old paths of entries whose slug or
/// type changed.
fn stale_paths(snapshot: &ContentSnapshot, superseded: &Superseded, locale: &str) -> Vec<PathBuf> {
    let deleted = superseded
        .deleted
        .iter()
        .filter_map(|entry| render::output_path(entry, locale));
    let moved = superseded.updated.iter().filter_map(|old| {
        let path = render::output_path(old, locale)?;
        let current = snapshot
            .entry(old.id())
            .and_then(|entry| render::output_path(entry, locale));
        (current.as_ref() != Some(&path)).then_some(path)
    });

    let mut seen = HashSet::new();
    deleted.chain(moved).filter(|path| seen.insert(path.clone())).collect()
}

/// The entry each output path belongs to: the lowest id claiming it.
fn path_owners<'a>(snapshot: &'a ContentSnapshot, locale: &str) -> HashMap<PathBuf, &'a str> {
    let mut owners = HashMap::new();
    for entry in snapshot.entries_of(PAGE_TYPE).chain(snapshot.entries_of(POST_TYPE)) {
        if let Some(path) = render::output_path(entry, locale) {
            owners.entry(path).or_insert(entry.id());
        }
    }
    owners
}

fn owns_path(owners: &HashMap<PathBuf, &str>, entry: &Entry, locale: &str) -> bool {
    render::output_path(entry, locale)
        .and_then(|path| owners.get(&path))
        .is_some_and(|owner| *owner == entry.id())
}

/// Changed entries first, then entries linking to anything that changed,
/// then entries rendering to a path that was just vacated.
fn delta_targets(
    snapshot: &ContentSnapshot,
    result: &FetchResult,
    stale: &[PathBuf],
    locale: &str,
) -> Vec<String> {
    let changed: HashSet<&str> = result
        .entries
        .iter()
        .map(Entry::id)
        .chain(result.assets.iter().map(|a| a.id()))
        .chain(result.deleted_entries.iter().map(String::as_str))
        .chain(result.deleted_assets.iter().map(String::as_str))
        .collect();

    let reclaimed = snapshot
        .entries_of(PAGE_TYPE)
        .chain(snapshot.entries_of(POST_TYPE))
        .filter(|entry| {
            render::output_path(entry, locale).is_some_and(|path| stale.contains(&path))
        })
        .map(Entry::id);

    let mut seen = HashSet::new();
    result
        .entries
        .iter()
        .map(Entry::id)
        .chain(snapshot.dependents_of(&changed).into_iter().map(Entry::id))
        .chain(reclaimed)
        .filter(|id| seen.insert(*id))
        .map(str::to_owned)
        .collect()
}
