//! Image processing for the `img` task.
//!
//! - [`raster`]: lossless WebP copies, PNG/JPEG recompression
//! - [`svg`]: SVG rewriting

pub mod raster;
pub mod svg;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::utils::path::extension_lower;

#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    /// Emit a `.webp` copy next to every jpg/jpeg/png.
    pub webp: bool,
    /// Recompress the original (production).
    pub compress: bool,
    pub jpeg_quality: u8,
}

/// Rasters that get a WebP copy.
pub fn has_webp_variant(path: &Path) -> bool {
    matches!(extension_lower(path).as_str(), "jpg" | "jpeg" | "png")
}

pub fn webp_path(output: &Path) -> PathBuf {
    output.with_extension("webp")
}

/// Every file written for a source whose mirrored output is `output`.
pub fn planned_outputs(source: &Path, output: &Path, options: &ImageOptions) -> Vec<PathBuf> {
    let mut outputs = vec![output.to_path_buf()];
    if options.webp && has_webp_variant(source) {
        outputs.push(webp_path(output));
    }
    outputs
}

/// The bytes to write for the original: recompressed when that is smaller,
/// otherwise the input unchanged.
pub fn optimize_original<'a>(
    source: &Path,
    data: &'a [u8],
    options: &ImageOptions,
) -> Result<Cow<'a, [u8]>> {
    if !options.compress {
        return Ok(Cow::Borrowed(data));
    }
    let candidate = match extension_lower(source).as_str() {
        "png" => raster::recompress_png(data)?,
        "jpg" | "jpeg" => raster::recompress_jpeg(data, options.jpeg_quality)?,
        "svg" => svg::optimize_svg(data)?,
        _ => return Ok(Cow::Borrowed(data)),
    };
    Ok(if candidate.len() < data.len() {
        Cow::Owned(candidate)
    } else {
        Cow::Borrowed(data)
    })
}
