//! Markdown → HTML.

use pulldown_cmark::{Options, Parser, html::push_html};

/// Convert markdown to HTML with the usual GFM extensions
/// (tables, strikethrough, task lists).
///
/// Raw HTML in the source passes through unchanged: markdown fields are
/// authored in the CMS and trusted.
pub fn markdown_to_html(text: &str) -> String {
    let options =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(text, options);

    let mut html = String::with_capacity(text.len() * 2);
    push_html(&mut html, parser);
    html
}
