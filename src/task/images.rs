//! `img`: WebP copies and production recompression, skipping fresh files.
//!
//! Sources that share a stem in one directory (`a.png`, `a.jpg`) would
//! write the same `a.webp`; the first in path order owns it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::config::{ClassEntry, SiteConfig};
use crate::freshness::all_fresh;
use crate::image::{self, ImageOptions};
use crate::utils::path::write_output;

use super::{FileOutcome, TaskReport, output_for};

pub fn run(config: &SiteConfig, entry: &ClassEntry) -> TaskReport {
    let options = ImageOptions {
        webp: config.build.images.webp,
        compress: config.mode().compress_images,
        jpeg_quality: config.build.images.jpeg_quality,
    };
    let root = config.get_root();
    let sources = entry.expand(root);
    let owners = webp_owners(&sources, |source| output_for(entry, source, root));
    let outcomes: Vec<FileOutcome> = sources
        .par_iter()
        .map(|source| {
            let output = output_for(entry, source, root);
            let options = ImageOptions {
                webp: options.webp && owners.contains(source),
                ..options
            };
            let planned = image::planned_outputs(source, &output, &options);
            if all_fresh(source, &planned) {
                return FileOutcome::Skipped;
            }
            match process(source, &output, &options) {
                Ok(written) => FileOutcome::Written(written),
                Err(e) => FileOutcome::Failed(source.clone(), e),
            }
        })
        .collect();
    TaskReport::from_outcomes("img", outcomes)
}

/// Sources that write their `.webp` copy.
fn webp_owners(sources: &[PathBuf], output: impl Fn(&Path) -> PathBuf) -> FxHashSet<PathBuf> {
    let mut sorted: Vec<&PathBuf> = sources.iter().filter(|s| image::has_webp_variant(s)).collect();
    sorted.sort();
    let mut claimed = FxHashSet::default();
    sorted
        .into_iter()
        .filter(|source| claimed.insert(image::webp_path(&output(source))))
        .cloned()
        .collect()
}

fn process(source: &Path, output: &Path, options: &ImageOptions) -> Result<Vec<PathBuf>> {
    let data = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let mut written = Vec::with_capacity(2);

    let original = image::optimize_original(source, &data, options)?;
    write_output(output, &*original)?;
    written.push(output.to_path_buf());

    if options.webp && image::has_webp_variant(source) {
        let webp_path = image::webp_path(output);
        write_output(&webp_path, image::raster::to_webp(&data)?)?;
        written.push(webp_path);
    }
    Ok(written)
}
