//! `fonts`: copy every source, derive WOFF/EOT/WOFF2 (and sfnt from WOFF).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::config::{ClassEntry, FontFormat, SiteConfig};
use crate::freshness::is_output_fresh;
use crate::pipeline::font;
use crate::utils::path::{copy_output, write_output};

use super::{FileOutcome, TaskReport, output_for};

pub fn run(config: &SiteConfig, entry: &ClassEntry) -> TaskReport {
    let formats = config.build.fonts.derived();
    let root = config.get_root();
    let outcomes: Vec<FileOutcome> = entry
        .expand(root)
        .par_iter()
        .map(|source| {
            let output = output_for(entry, source, root);
            if is_fresh(source, &output, &formats) {
                return FileOutcome::Skipped;
            }
            match process(source, &output, &formats) {
                Ok(written) => FileOutcome::Written(written),
                Err(e) => FileOutcome::Failed(source.clone(), e),
            }
        })
        .collect();
    TaskReport::from_outcomes("fonts", outcomes)
}

/// The copy and every derived file exist and are newer than the source.
fn is_fresh(source: &Path, output: &Path, formats: &[FontFormat]) -> bool {
    let Some(dir) = output.parent() else {
        return false;
    };
    is_output_fresh(source, output)
        && font::planned_names(source, formats).iter().all(|names| {
            names
                .iter()
                .any(|name| is_output_fresh(source, &dir.join(name)))
        })
}

fn process(source: &Path, output: &Path, formats: &[FontFormat]) -> Result<Vec<PathBuf>> {
    copy_output(source, output)?;
    let mut written = vec![output.to_path_buf()];
    if !font::is_convertible(source) {
        return Ok(written);
    }

    let data = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let dir = output.parent().unwrap_or(Path::new("."));
    for file in font::derive(source, &data, formats)? {
        let path = dir.join(&file.file_name);
        write_output(&path, &file.data)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssetClass;
    use crate::pipeline::font::Sfnt;
    use crate::task::fixture;

    /// Smallest font the container code accepts: one `head` table.
    fn tiny_ttf() -> Vec<u8> {
        let mut font = vec![0, 1, 0, 0, 0, 1, 0, 16, 0, 0, 0, 0];
        font.extend_from_slice(b"head");
        font.extend_from_slice(&0u32.to_be_bytes());
        font.extend_from_slice(&28u32.to_be_bytes());
        font.extend_from_slice(&8u32.to_be_bytes());
        font.extend_from_slice(&[7u8; 8]);
        font
    }

    fn run_fonts(config: &SiteConfig) -> TaskReport {
        run(config, config.registry.get(AssetClass::Fonts).unwrap())
    }

    #[test]
    fn test_ttf_outputs() {
        let (_dir, config) = fixture::project("");
        let root = config.get_root();
        fixture::write(root, "src/fonts/Inter.ttf", tiny_ttf());
        fixture::write(root, "src/fonts/Legacy.eot", b"eot");

        let report = run_fonts(&config);
        assert!(report.is_ok(), "{:?}", report.failures);
        let dest = root.join("dist/fonts");
        for name in ["Inter.ttf", "Inter.woff", "Inter.eot", "Inter.woff2", "Legacy.eot"] {
            assert!(dest.join(name).exists(), "{name}");
        }
        assert!(!dest.join("Legacy.woff").exists());
        assert!(Sfnt::parse(&fs::read(dest.join("Inter.ttf")).unwrap()).is_ok());
    }

    #[test]
    fn test_unchanged_fonts_skipped() {
        let (_dir, config) = fixture::project("");
        fixture::write(config.get_root(), "src/fonts/Inter.ttf", tiny_ttf());
        run_fonts(&config);
        let report = run_fonts(&config);
        assert_eq!(report.skipped, 1);
        assert!(report.written.is_empty());
    }

    #[test]
    fn test_configured_formats() {
        let (_dir, config) = fixture::project("[build.fonts]\nformats = [\"woff2\"]\n");
        fixture::write(config.get_root(), "src/fonts/Inter.ttf", tiny_ttf());
        let report = run_fonts(&config);
        assert_eq!(report.written.len(), 2);
        assert!(!config.get_root().join("dist/fonts/Inter.woff").exists());
    }

    #[test]
    fn test_corrupt_font_still_copied_but_reported() {
        let (_dir, config) = fixture::project("");
        fixture::write(config.get_root(), "src/fonts/Bad.ttf", b"garbage");
        let report = run_fonts(&config);
        assert_eq!(report.failures.len(), 1);
        assert!(config.get_root().join("dist/fonts/Bad.ttf").exists());
    }
}
