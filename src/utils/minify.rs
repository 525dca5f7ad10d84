//! HTML minification, applied to rendered documents when `[build].minify`
//! is set.

use std::borrow::Cow;

/// Minify `html` if `enabled`; otherwise hand it back untouched.
pub fn minify_html(html: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(html);
    }

    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;

    let bytes = minify_html::minify(html.as_bytes(), &cfg);
    match String::from_utf8(bytes) {
        Ok(minified) => Cow::Owned(minified),
        Err(_) => Cow::Borrowed(html),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello World</p>\n  </body>\n</html>";

    #[test]
    fn test_minify_removes_whitespace() {
        let result = minify_html(PAGE, true);
        assert!(!result.contains("\n  "));
        assert!(result.contains("<p>Hello World</p>"));
        assert!(result.len() < PAGE.len());
    }

    #[test]
    fn test_minify_disabled_is_identity() {
        assert!(matches!(minify_html(PAGE, false), Cow::Borrowed(s) if s == PAGE));
    }
}
