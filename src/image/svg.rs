//! SVG rewriting with usvg.

use anyhow::{Context, Result};

/// Parse and re-serialize an SVG without indentation.
///
/// usvg resolves styles and drops editor metadata, which is what makes the
/// output smaller; callers still compare sizes before keeping it.
pub fn optimize_svg(content: &[u8]) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("failed to parse svg")?;
    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(tree.to_string(&write_options).into_bytes())
}
