//! The home page: site intro, every page, and the latest posts.

use super::{
    OutputFile, RenderContext, RenderError,
    blog::{BLOG_DIR, PostSummary, summary_item},
    layout::page_shell,
    required, slug,
};
use crate::content::Entry;
use maud::html;
use std::path::PathBuf;

/// Posts listed on the home page; the rest are on the blog index.
pub const HOME_POSTS: usize = 5;

/// What the home page needs to know about a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub slug: String,
    pub title: String,
}

impl PageLink {
    pub fn from_entry(entry: &Entry, locale: &str) -> Result<Self, RenderError> {
        Ok(Self {
            slug: slug(entry, locale)?.to_owned(),
            title: required(entry, "title", locale)?.to_owned(),
        })
    }

    pub fn url(&self) -> String {
        format!("/{}.html", self.slug)
    }
}

/// Render `index.html`. Pages are listed in the order given; `posts` are
/// expected newest first and cut to [`HOME_POSTS`].
pub fn render_home(pages: &[PageLink], posts: &[PostSummary], ctx: &RenderContext) -> OutputFile {
    let latest = &posts[..posts.len().min(HOME_POSTS)];

    let content = html! {
        section.home {
            h1 { (ctx.site_title) }
            @if !ctx.site_description.is_empty() {
                p.intro { (ctx.site_description) }
            }
            @if !pages.is_empty() {
                ul.pages {
                    @for page in pages {
                        li { a href=(page.url()) { (page.title) } }
                    }
                }
            }
            h2 { "Latest posts" }
            @if latest.is_empty() {
                p { "Nothing here yet." }
            } @else {
                ul.posts {
                    @for post in latest {
                        (summary_item(post))
                    }
                }
            }
            @if posts.len() > latest.len() {
                p.more { a href=(format!("/{BLOG_DIR}/index.html")) { "All posts" } }
            }
        }
    };

    OutputFile {
        path: PathBuf::from("index.html"),
        content: page_shell(ctx, "Home", "", content).into_string(),
    }
}
