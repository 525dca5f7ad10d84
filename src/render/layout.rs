//! The page shell shared by every rendered document.
//!
//! Navigation, header and footer are constant across the site; only the
//! title, description and `main` content vary. maud escapes every
//! interpolated string; markdown output is the only `PreEscaped` input.

use super::RenderContext;
use maud::{DOCTYPE, Markup, html};

/// Generator tag baked into every page.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wrap `content` in the site shell.
pub fn page_shell(ctx: &RenderContext, title: &str, description: &str, content: Markup) -> Markup {
    let description = if description.is_empty() {
        ctx.site_description
    } else {
        description
    };

    html! {
        (DOCTYPE)
        html lang=(ctx.locale) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="generator" content=(format!("syncsite v{VERSION}"));
                @if !description.is_empty() {
                    meta name="description" content=(description);
                }
                title { (title) " | " (ctx.site_title) }
            }
            body {
                header {
                    nav {
                        a href="/" { "Home" }
                        " "
                        a href="/blog/index.html" { "Blog" }
                    }
                    p.site-title { (ctx.site_title) }
                }
                main { (content) }
                footer {
                    @if !ctx.copyright.is_empty() {
                        p { "© " (ctx.copyright) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::context;

    #[test]
    fn test_shell_structure() {
        let html = page_shell(&context(), "About", "all about us", html! { p { "hi" } }).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en-US">"#));
        assert!(html.contains("<title>About | Mowebev</title>"));
        assert!(html.contains(r#"<meta name="description" content="all about us">"#));
        assert!(html.contains(r#"<a href="/blog/index.html">Blog</a>"#));
        assert!(html.contains("<main><p>hi</p></main>"));
    }

    #[test]
    fn test_shell_escapes_title_and_description() {
        let html = page_shell(&context(), "<b>x</b>", "\"quoted\"", html! {}).into_string();

        assert!(html.contains("<title>&lt;b&gt;x&lt;/b&gt; | Mowebev</title>"));
        assert!(html.contains("content=\"&quot;quoted&quot;\""));
    }

    #[test]
    fn test_shell_falls_back_to_site_description() {
        let html = page_shell(&context(), "t", "", html! {}).into_string();
        assert!(html.contains(r#"content="Walks and boats""#));
    }
}
