//! Web font conversion.
//!
//! | Source            | Outputs (besides the copy)  |
//! |-------------------|-----------------------------|
//! | `ttf` / `otf`     | `woff`, `eot`, `woff2`      |
//! | `woff`            | `ttf`/`otf` (decoded), `eot`, `woff2` |
//! | anything else     | none                        |

mod eot;
mod sfnt;
mod woff;
mod woff2;

pub use sfnt::{FontError, Sfnt};

use std::path::Path;

use crate::config::section::FontFormat;
use crate::utils::path::extension_lower;

/// A derived font file, named relative to the source's output directory.
#[derive(Debug)]
pub struct FontFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Whether `path` is a container this module converts.
pub fn is_convertible(path: &Path) -> bool {
    matches!(extension_lower(path).as_str(), "ttf" | "otf" | "woff")
}

/// Names of the files [`derive`] would produce, for freshness checks.
///
/// Each entry lists the acceptable names of one output: the decoded flavor
/// of a WOFF source is unknown until it is read, so that entry has two.
pub fn planned_names(path: &Path, formats: &[FontFormat]) -> Vec<Vec<String>> {
    let stem = stem(path);
    let mut names = Vec::new();
    match extension_lower(path).as_str() {
        "ttf" | "otf" => {
            if formats.contains(&FontFormat::Woff) {
                names.push(vec![format!("{stem}.woff")]);
            }
        }
        "woff" => {
            if formats.contains(&FontFormat::Sfnt) {
                names.push(vec![format!("{stem}.ttf"), format!("{stem}.otf")]);
            }
        }
        _ => return names,
    }
    if formats.contains(&FontFormat::Eot) {
        names.push(vec![format!("{stem}.eot")]);
    }
    if formats.contains(&FontFormat::Woff2) {
        names.push(vec![format!("{stem}.woff2")]);
    }
    names
}

/// Convert one font source into its derived formats.
pub fn derive(path: &Path, data: &[u8], formats: &[FontFormat]) -> Result<Vec<FontFile>, FontError> {
    let stem = stem(path);
    let mut out = Vec::new();
    let font = match extension_lower(path).as_str() {
        "ttf" | "otf" => {
            let font = Sfnt::parse(data)?;
            if formats.contains(&FontFormat::Woff) {
                out.push(FontFile {
                    file_name: format!("{stem}.woff"),
                    data: woff::encode(&font)?,
                });
            }
            font
        }
        "woff" => {
            let font = woff::decode(data)?;
            if formats.contains(&FontFormat::Sfnt) {
                out.push(FontFile {
                    file_name: format!("{stem}.{}", font.extension()),
                    data: font.to_bytes(),
                });
            }
            font
        }
        _ => return Ok(out),
    };
    if formats.contains(&FontFormat::Eot) {
        out.push(FontFile {
            file_name: format!("{stem}.eot"),
            data: eot::encode(&font)?,
        });
    }
    if formats.contains(&FontFormat::Woff2) {
        out.push(FontFile {
            file_name: format!("{stem}.woff2"),
            data: woff2::encode(&font)?,
        });
    }
    Ok(out)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfnt::{CFF, TRUETYPE, sample};

    const ALL: [FontFormat; 3] = [FontFormat::Sfnt, FontFormat::Woff, FontFormat::Woff2];

    fn names(files: &[FontFile]) -> Vec<&str> {
        files.iter().map(|f| f.file_name.as_str()).collect()
    }

    #[test]
    fn test_ttf_derives_woff_and_woff2() {
        let bytes = sample(TRUETYPE).to_bytes();
        let files = derive(Path::new("fonts/Inter.ttf"), &bytes, &ALL).unwrap();
        assert_eq!(names(&files), vec!["Inter.woff", "Inter.woff2"]);
        assert_eq!(&files[0].data[..4], b"wOFF");
        assert_eq!(&files[1].data[..4], b"wOF2");
    }

    #[test]
    fn test_woff_decodes_to_flavor() {
        let font = sample(CFF);
        let woff_bytes = woff::encode(&font).unwrap();
        let files = derive(Path::new("Serif.woff"), &woff_bytes, &ALL).unwrap();
        assert_eq!(names(&files), vec!["Serif.otf", "Serif.woff2"]);
        assert_eq!(files[0].data, font.to_bytes());
    }

    #[test]
    fn test_formats_filter_outputs() {
        let bytes = sample(TRUETYPE).to_bytes();
        let files = derive(Path::new("a.ttf"), &bytes, &[FontFormat::Woff2]).unwrap();
        assert_eq!(names(&files), vec!["a.woff2"]);
        assert_eq!(
            planned_names(Path::new("a.ttf"), &[FontFormat::Woff2]),
            vec![vec!["a.woff2".to_string()]]
        );
        assert_eq!(planned_names(Path::new("b.woff"), &ALL).len(), 2);
    }

    #[test]
    fn test_other_containers_not_converted() {
        assert!(!is_convertible(Path::new("a.woff2")));
        assert!(!is_convertible(Path::new("a.eot")));
        assert!(derive(Path::new("a.eot"), b"eot", &ALL).unwrap().is_empty());
        assert!(planned_names(Path::new("a.svg"), &ALL).is_empty());
    }

    #[test]
    fn test_eot_derived_from_sfnt_and_woff() {
        let formats = [FontFormat::Eot];
        let font = sample(TRUETYPE);
        let files = derive(Path::new("Inter.ttf"), &font.to_bytes(), &formats).unwrap();
        assert_eq!(names(&files), vec!["Inter.eot"]);
        assert!(files[0].data.ends_with(&font.to_bytes()));

        let woff_bytes = woff::encode(&font).unwrap();
        let files = derive(Path::new("Inter.woff"), &woff_bytes, &formats).unwrap();
        assert_eq!(names(&files), vec!["Inter.eot"]);
        assert_eq!(
            planned_names(Path::new("Inter.woff"), &formats),
            vec![vec!["Inter.eot".to_string()]]
        );
    }

    #[test]
    fn test_corrupt_source_fails() {
        assert!(derive(Path::new("bad.ttf"), b"nope", &ALL).is_err());
    }
}
