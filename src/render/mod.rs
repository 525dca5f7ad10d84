//! Entry → HTML document.
//!
//! Dispatch is purely on the content type id:
//!
//! | Content type | Output               | Template            |
//! |--------------|----------------------|---------------------|
//! | `page`       | `<slug>.html`        | [`page::render`]    |
//! | `post`       | `blog/<slug>.html`   | [`post::render`]    |
//! | anything else| nothing              |                     |
//!
//! Comments and tags only appear inside the post that links them. The home
//! page (`index.html`) and blog index (`blog/index.html`) are rendered once
//! per build by [`home`] and [`blog`]; the slug `index` is reserved for them.

pub mod blog;
pub mod home;
mod layout;
pub mod markdown;
mod page;
mod post;

pub use blog::{BLOG_DIR, PostSummary, render_blog_index, sort_posts};
pub use home::{PageLink, render_home};

use crate::{config::SiteConfig, content::Entry, utils::slug::is_safe_slug};
use std::path::PathBuf;
use thiserror::Error;

/// A rendered document, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub content: String,
}

/// Why a single entry could not be rendered. The entry is skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("{content_type} `{entry}` has no `{field}`")]
    MissingField {
        entry: String,
        content_type: String,
        field: &'static str,
    },

    #[error("{content_type} `{entry}` has unusable slug `{slug}`")]
    UnsafeSlug {
        entry: String,
        content_type: String,
        slug: String,
    },

    #[error("{content_type} `{entry}` uses slug `{slug}`, which is reserved for the site index")]
    ReservedSlug {
        entry: String,
        content_type: String,
        slug: String,
    },
}

/// Site-wide values every template needs.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub site_title: &'a str,
    pub site_description: &'a str,
    pub copyright: &'a str,
    /// Locale key used to read entry fields.
    pub locale: &'a str,
    /// Where the comment form posts; `None` hides the form.
    pub comment_endpoint: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn from_config(config: &'a SiteConfig) -> Self {
        Self {
            site_title: &config.base.title,
            site_description: &config.base.description,
            copyright: &config.base.copyright,
            locale: &config.base.locale,
            comment_endpoint: config
                .comments
                .enable
                .then_some(config.comments.endpoint.as_str()),
        }
    }
}

/// Content types with their own output file.
pub const PAGE_TYPE: &str = "page";
pub const POST_TYPE: &str = "post";

/// Slug of the generated index pages, at the root and under `blog/`.
const INDEX_SLUG: &str = "index";

/// Render one entry; `Ok(None)` for content types without a page of their own.
pub fn render_entry(entry: &Entry, ctx: &RenderContext) -> Result<Option<OutputFile>, RenderError> {
    match entry.content_type_id() {
        PAGE_TYPE => page::render(entry, ctx).map(Some),
        POST_TYPE => post::render(entry, ctx).map(Some),
        _ => Ok(None),
    }
}

/// Output path an entry renders to, without rendering it.
///
/// Used to remove files of deleted or moved entries and to detect two
/// entries claiming one file.
pub fn output_path(entry: &Entry, locale: &str) -> Option<PathBuf> {
    let slug = slug(entry, locale).ok()?;
    match entry.content_type_id() {
        PAGE_TYPE => Some(PathBuf::from(format!("{slug}.html"))),
        POST_TYPE => Some(PathBuf::from(BLOG_DIR).join(format!("{slug}.html"))),
        _ => None,
    }
}

/// A required text field, or `MissingField`.
fn required<'e>(entry: &'e Entry, field: &'static str, locale: &str) -> Result<&'e str, RenderError> {
    entry.text(field, locale).ok_or_else(|| RenderError::MissingField {
        entry: entry.id().to_owned(),
        content_type: entry.content_type_id().to_owned(),
        field,
    })
}

/// The entry's slug, checked to be usable as a file name.
fn slug<'e>(entry: &'e Entry, locale: &str) -> Result<&'e str, RenderError> {
    let slug = required(entry, "slug", locale)?;
    if is_safe_slug(slug) && slug != INDEX_SLUG {
        return Ok(slug);
    }

    let (entry, content_type) = (entry.id().to_owned(), entry.content_type_id().to_owned());
    let slug = slug.to_owned();
    Err(if slug == INDEX_SLUG {
        RenderError::ReservedSlug { entry, content_type, slug }
    } else {
        RenderError::UnsafeSlug { entry, content_type, slug }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::types::fixtures::{LOCALE, entry};
    use serde_json::json;

    pub(crate) fn context() -> RenderContext<'static> {
        RenderContext {
            site_title: "Mowebev",
            site_description: "Walks and boats",
            copyright: "2025 Mowebev",
            locale: LOCALE,
            comment_endpoint: Some("/api/comments"),
        }
    }

    #[test]
    fn test_page_dispatch() {
        let page = entry(
            "p1",
            "page",
            json!({ "slug": "about", "title": "About Us", "metaDescription": "d", "body": "# Hi" }),
        );

        let file = render_entry(&page, &context()).unwrap().unwrap();

        assert_eq!(file.path, PathBuf::from("about.html"));
        assert!(file.content.contains("<h1>Hi</h1>"));
        assert!(file.content.contains("About Us"));
    }

    #[test]
    fn test_post_dispatch() {
        let post = entry("p2", "post", json!({ "slug": "trip", "title": "Trip", "description": "desc" }));
        let file = render_entry(&post, &context()).unwrap().unwrap();
        assert_eq!(file.path, PathBuf::from("blog/trip.html"));
    }

    #[test]
    fn test_other_types_are_skipped() {
        for content_type in ["tag", "comment", "author", ""] {
            let e = entry("x", content_type, json!({ "slug": "x", "title": "X", "comment": "hi" }));
            assert_eq!(render_entry(&e, &context()), Ok(None), "{content_type}");
        }
    }

    #[test]
    fn test_missing_slug() {
        let page = entry("p1", "page", json!({ "title": "About" }));
        assert_eq!(
            render_entry(&page, &context()),
            Err(RenderError::MissingField {
                entry: "p1".into(),
                content_type: "page".into(),
                field: "slug",
            })
        );
    }

    #[test]
    fn test_unsafe_slug() {
        for slug in ["../etc/passwd", "a/b", ".hidden", "a\\b"] {
            let page = entry("p1", "page", json!({ "slug": slug, "title": "t", "body": "b" }));
            assert!(
                matches!(render_entry(&page, &context()), Err(RenderError::UnsafeSlug { .. })),
                "{slug}"
            );
        }
    }

    #[test]
    fn test_index_slug_is_reserved() {
        for content_type in ["page", "post"] {
            let e = entry(
                "x",
                content_type,
                json!({ "slug": "index", "title": "t", "body": "b", "description": "d" }),
            );
            assert!(
                matches!(render_entry(&e, &context()), Err(RenderError::ReservedSlug { .. })),
                "{content_type}"
            );
            assert_eq!(output_path(&e, LOCALE), None, "{content_type}");
        }
    }

    #[test]
    fn test_output_path() {
        let page = entry("p1", "page", json!({ "slug": "about" }));
        let post = entry("p2", "post", json!({ "slug": "trip" }));
        let tag = entry("t", "tag", json!({ "slug": "sailing" }));
        let bad = entry("b", "post", json!({ "slug": "../x" }));

        assert_eq!(output_path(&page, LOCALE), Some(PathBuf::from("about.html")));
        assert_eq!(output_path(&post, LOCALE), Some(PathBuf::from("blog/trip.html")));
        assert_eq!(output_path(&tag, LOCALE), None);
        assert_eq!(output_path(&bad, LOCALE), None);
    }

    #[test]
    fn test_render_is_deterministic() {
        let post = entry(
            "p2",
            "post",
            json!({ "slug": "trip", "title": "Trip", "description": "desc", "publishDate": "2024-05-01" }),
        );
        let a = render_entry(&post, &context()).unwrap();
        let b = render_entry(&post, &context()).unwrap();
        assert_eq!(a, b);
    }
}
