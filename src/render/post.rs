//! `post` entries: blog articles under `blog/`, with tags, hero image,
//! comments and the comment form.

use super::{
    BLOG_DIR, OutputFile, RenderContext, RenderError, layout::page_shell,
    markdown::markdown_to_html, required, slug,
};
use crate::content::Entry;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use maud::{Markup, PreEscaped, html};
use std::path::PathBuf;

/// Fields: `slug`, `title`, `description` or `body` (markdown), and optionally
/// `metaDescription`, `publishDate`, `tags`, `heroImage`, `comments`.
pub fn render(entry: &Entry, ctx: &RenderContext) -> Result<OutputFile, RenderError> {
    let locale = ctx.locale;
    let slug = slug(entry, locale)?;
    let title = required(entry, "title", locale)?;
    let text = entry
        .text("description", locale)
        .or_else(|| entry.text("body", locale))
        .ok_or_else(|| RenderError::MissingField {
            entry: entry.id().to_owned(),
            content_type: entry.content_type_id().to_owned(),
            field: "description",
        })?;
    let description = entry.text("metaDescription", locale).unwrap_or_default();

    let date = entry.text("publishDate", locale).and_then(parse_date);
    let hero = entry.linked_asset("heroImage", locale).and_then(|asset| {
        let url = asset.url(locale)?;
        Some((url, asset.title(locale).unwrap_or(title).to_owned()))
    });
    let tags: Vec<String> = entry
        .linked_entries("tags", locale)
        .iter()
        .filter_map(|tag| tag.text("title", locale).map(str::to_owned))
        .collect();
    let comments: Vec<String> = entry
        .linked_entries("comments", locale)
        .iter()
        .filter_map(|comment| comment.text("comment", locale).map(str::to_owned))
        .collect();

    let content = html! {
        article.post {
            h1.title { (title) }
            @if let Some(date) = date {
                time datetime=(date.format("%Y-%m-%d").to_string()) { (date.format("%B %-d, %Y").to_string()) }
            }
            @if let Some((url, alt)) = &hero {
                figure.hero {
                    img src=(url) alt=(alt);
                }
            }
            @if !tags.is_empty() {
                ul.tags {
                    @for tag in &tags {
                        li { (tag) }
                    }
                }
            }
            (PreEscaped(markdown_to_html(text)))
        }
        section.comments {
            h2 { "Comments" }
            @if comments.is_empty() {
                p { "No comments yet." }
            } @else {
                ol.comments {
                    @for comment in &comments {
                        li { (comment) }
                    }
                }
            }
            @if let Some(endpoint) = ctx.comment_endpoint {
                (comment_form(endpoint, entry.id(), slug))
            }
        }
    };

    Ok(OutputFile {
        path: PathBuf::from(BLOG_DIR).join(format!("{slug}.html")),
        content: page_shell(ctx, title, description, content).into_string(),
    })
}

/// Plain form post to our own endpoint; no script, no credentials.
fn comment_form(endpoint: &str, post_id: &str, slug: &str) -> Markup {
    html! {
        form.comment-form method="post" action=(endpoint) {
            input type="hidden" name="post" value=(post_id);
            input type="hidden" name="slug" value=(slug);
            label for="comment" { "Leave a comment" }
            textarea #comment name="comment" rows="4" required {}
            button type="submit" { "Post comment" }
        }
    }
}

/// Parse the CMS's date formats: full RFC 3339, minute precision with
/// offset (`2017-05-12T00:00+02:00`), or a bare date.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z").map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}
