//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "My Site".into()
    }

    pub fn locale() -> String {
        "en-US".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use super::super::FetchMode;
    use std::path::PathBuf;

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn state_dir() -> PathBuf {
        ".syncsite".into()
    }

    pub fn fetch_mode() -> FetchMode {
        FetchMode::default()
    }
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    pub fn environment() -> String {
        "master".into()
    }

    pub fn delivery_url() -> String {
        "https://cdn.contentful.com".into()
    }

    pub fn preview_url() -> String {
        "https://preview.contentful.com".into()
    }

    pub fn management_url() -> String {
        "https://api.contentful.com".into()
    }

    pub fn timeout_secs() -> u64 {
        60
    }
}

// ============================================================================
// [comments] Section Defaults
// ============================================================================

pub mod comments {
    pub fn endpoint() -> String {
        "/api/comments".into()
    }

    pub fn max_length() -> usize {
        2000
    }

    pub fn max_body() -> usize {
        16 * 1024
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }
}
