//! Markup pipeline: includes, WebP `<picture>` rewrite, minification.

mod include;
mod minify;
mod webp;

pub use include::expand_file;
pub use minify::minify_markup;
pub use webp::{rewrite as rewrite_webp, webp_url};

use std::path::Path;

use anyhow::Result;

/// Rendered page before the optional minification step.
pub fn render(path: &Path, webp: bool) -> Result<String> {
    let html = expand_file(path)?;
    Ok(if webp { rewrite_webp(&html) } else { html })
}
