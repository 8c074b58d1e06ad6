//! Shared helpers: globs, paths, MIME types, formatting.

pub mod fmt;
pub mod glob;
pub mod mime;
pub mod path;

pub use fmt::{format_size, plural_count};
