//! Comment submissions posted by the blog's comment form.
//!
//! Parsing and validation only; the server hands a valid [`CommentForm`]
//! to the management client.

use crate::utils::slug::is_safe_slug;
use thiserror::Error;
use url::form_urlencoded;

/// Why a submission was rejected. Always answered with `400`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("comment is empty")]
    Empty,

    #[error("comment is longer than {max} characters")]
    TooLong { max: usize },

    #[error("invalid post id")]
    InvalidPost,

    #[error("invalid post slug")]
    InvalidSlug,
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentForm {
    /// Entry id of the post being commented on.
    pub post: String,
    /// Slug of that post, for the redirect back.
    pub slug: String,
    /// Sanitized comment text.
    pub comment: String,
}

impl CommentForm {
    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Unknown fields are ignored; a repeated field keeps its last value.
    pub fn parse(body: &[u8], max_length: usize) -> Result<Self, CommentError> {
        let (mut post, mut slug, mut comment) = (String::new(), String::new(), String::new());
        for (key, value) in form_urlencoded::parse(body) {
            match key.as_ref() {
                "post" => post = value.into_owned(),
                "slug" => slug = value.into_owned(),
                "comment" => comment = value.into_owned(),
                _ => {}
            }
        }

        if !is_entry_id(&post) {
            return Err(CommentError::InvalidPost);
        }
        if !is_safe_slug(&slug) {
            return Err(CommentError::InvalidSlug);
        }

        Ok(Self {
            post,
            slug,
            comment: sanitize_comment(&comment, max_length)?,
        })
    }

    /// Where the visitor goes after posting.
    pub fn redirect_path(&self) -> String {
        format!("/{}/{}.html", crate::render::BLOG_DIR, self.slug)
    }
}

/// Trim and strip control characters other than newline and tab.
///
/// Length is counted in characters after sanitizing.
pub fn sanitize_comment(text: &str, max_length: usize) -> Result<String, CommentError> {
    let cleaned: String = text
        .replace("\r\n", "\n")
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(CommentError::Empty);
    }
    if cleaned.chars().count() > max_length {
        return Err(CommentError::TooLong { max: max_length });
    }
    Ok(cleaned.to_owned())
}

/// CMS ids are short runs of `[A-Za-z0-9_-]`.
fn is_entry_id(id: &str) -> bool {
    (1..=64).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form() {
        let form = CommentForm::parse(
            b"post=5KsDBWseXY6QegucYAoacS&slug=trip&comment=Lovely+photos%21%0D%0ASee+you",
            100,
        )
        .unwrap();

        assert_eq!(form.post, "5KsDBWseXY6QegucYAoacS");
        assert_eq!(form.slug, "trip");
        assert_eq!(form.comment, "Lovely photos!\nSee you");
        assert_eq!(form.redirect_path(), "/blog/trip.html");
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let form = CommentForm::parse(b"token=x&post=p1&slug=a&comment=hi&extra=1", 100).unwrap();
        assert_eq!(form.comment, "hi");
    }

    #[test]
    fn test_invalid_post_id() {
        for body in [
            &b"slug=a&comment=hi"[..],
            b"post=&slug=a&comment=hi",
            b"post=..%2F..&slug=a&comment=hi",
            b"post=a+b&slug=a&comment=hi",
        ] {
            assert_eq!(CommentForm::parse(body, 100), Err(CommentError::InvalidPost));
        }
    }

    #[test]
    fn test_invalid_slug() {
        for body in [
            &b"post=p1&comment=hi"[..],
            b"post=p1&slug=..%2Fetc&comment=hi",
            b"post=p1&slug=a%2Fb&comment=hi",
        ] {
            assert_eq!(CommentForm::parse(body, 100), Err(CommentError::InvalidSlug));
        }
    }

    #[test]
    fn test_sanitize_strips_controls() {
        assert_eq!(
            sanitize_comment("  hi\u{0}\u{7}\tthere\u{1b}[31m \n", 100).unwrap(),
            "hi\tthere[31m"
        );
    }

    #[test]
    fn test_sanitize_keeps_markup_literal() {
        // escaping happens at render time
        assert_eq!(sanitize_comment("<b>hi</b>", 100).unwrap(), "<b>hi</b>");
    }

    #[test]
    fn test_empty_comment() {
        assert_eq!(sanitize_comment("", 100), Err(CommentError::Empty));
        assert_eq!(sanitize_comment(" \n\t\u{0} ", 100), Err(CommentError::Empty));
    }

    #[test]
    fn test_comment_length_in_chars() {
        assert_eq!(sanitize_comment("ééé", 3).unwrap(), "ééé");
        assert_eq!(sanitize_comment("éééé", 3), Err(CommentError::TooLong { max: 3 }));
    }
}
