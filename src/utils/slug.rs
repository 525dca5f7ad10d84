//! Slug checks.
//!
//! Slugs come straight from CMS fields and become file names under the
//! output root, so they must not be able to name anything outside it.

/// Characters never allowed in a slug.
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '"', '/', '\\', '\t', '\r', '\n', '\0',
];

/// Whether `slug` can be used verbatim as a single file name component.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug == slug.trim()
        && !slug.starts_with('.')
        && !slug.contains("..")
        && !slug.chars().any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_slugs() {
        for slug in ["about", "trip-to-the-sea", "2024_05", "über-uns", "v1.2"] {
            assert!(is_safe_slug(slug), "{slug}");
        }
    }

    #[test]
    fn test_unsafe_slugs() {
        for slug in [
            "", " about", "../etc", "a/b", "a\\b", ".hidden", "..", "a..b", "what?", "x\ny", "q\"",
        ] {
            assert!(!is_safe_slug(slug), "{slug:?}");
        }
    }
}
