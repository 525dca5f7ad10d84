//! Small helpers shared across the pipeline.

pub mod minify;
pub mod slug;
