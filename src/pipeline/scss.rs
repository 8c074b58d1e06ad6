//! SCSS compilation.

use std::path::Path;

use anyhow::{Result, anyhow};

/// Compile a Sass entry to expanded CSS. `@use`/`@import` resolve relative to
/// the entry's directory.
pub fn compile(entry: &Path) -> Result<String> {
    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(dir) = entry.parent() {
        options = options.load_path(dir);
    }
    grass::from_path(entry, &options).map_err(|e| anyhow!("{}: {e}", entry.display()))
}
