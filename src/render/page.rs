//! `page` entries: standalone documents at the output root.

use super::{OutputFile, RenderContext, RenderError, layout::page_shell, markdown::markdown_to_html, required, slug};
use crate::content::Entry;
use maud::{PreEscaped, html};
use std::path::PathBuf;

/// Fields: `slug`, `title`, `body` (markdown), `metaDescription` (optional).
pub fn render(entry: &Entry, ctx: &RenderContext) -> Result<OutputFile, RenderError> {
    let slug = slug(entry, ctx.locale)?;
    let title = required(entry, "title", ctx.locale)?;
    let body = required(entry, "body", ctx.locale)?;
    let description = entry.text("metaDescription", ctx.locale).unwrap_or_default();

    let content = html! {
        article.page {
            h1.title { (title) }
            (PreEscaped(markdown_to_html(body)))
        }
    };

    Ok(OutputFile {
        path: PathBuf::from(format!("{slug}.html")),
        content: page_shell(ctx, title, description, content).into_string(),
    })
}
