//! The blog index: one list of every post, newest first.

use super::{OutputFile, RenderContext, RenderError, layout::page_shell, post::parse_date, required, slug};
use crate::content::Entry;
use chrono::NaiveDate;
use maud::{Markup, html};
use std::{cmp::Ordering, path::PathBuf};

/// Directory posts render into, relative to the output root.
pub const BLOG_DIR: &str = "blog";

/// What the index needs to know about a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: Option<NaiveDate>,
}

impl PostSummary {
    pub fn from_entry(entry: &Entry, locale: &str) -> Result<Self, RenderError> {
        Ok(Self {
            slug: slug(entry, locale)?.to_owned(),
            title: required(entry, "title", locale)?.to_owned(),
            date: entry.text("publishDate", locale).and_then(parse_date),
        })
    }

    pub fn url(&self) -> String {
        format!("/{BLOG_DIR}/{}.html", self.slug)
    }
}

/// Newest first; undated posts last; ties by slug.
pub fn sort_posts(posts: &mut [PostSummary]) {
    posts.sort_by(compare_posts);
}

fn compare_posts(a: &PostSummary, b: &PostSummary) -> Ordering {
    match (a.date, b.date) {
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date).then_with(|| a.slug.cmp(&b.slug)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.slug.cmp(&b.slug),
    }
}

/// One `li` linking a post, with its date when known.
pub(super) fn summary_item(post: &PostSummary) -> Markup {
    html! {
        li {
            a href=(post.url()) { (post.title) }
            @if let Some(date) = post.date {
                " "
                time datetime=(date.format("%Y-%m-%d").to_string()) {
                    (date.format("%B %-d, %Y").to_string())
                }
            }
        }
    }
}

/// Render `blog/index.html`, listing `posts` in the order given.
pub fn render_blog_index(posts: &[PostSummary], ctx: &RenderContext) -> OutputFile {
    let content = html! {
        section.blog-index {
            h1 { "Blog" }
            @if posts.is_empty() {
                p { "Nothing here yet." }
            } @else {
                ul.posts {
                    @for post in posts {
                        (summary_item(post))
                    }
                }
            }
        }
    };

    OutputFile {
        path: PathBuf::from(BLOG_DIR).join("index.html"),
        content: page_shell(ctx, "Blog", "", content).into_string(),
    }
}
