//! Font configuration.
//!
//! ```toml
//! [build.fonts]
//! formats = ["ttf", "woff", "eot", "woff2"]
//! ```
//!
//! | Format  | Produced from          |
//! |---------|------------------------|
//! | `ttf`   | WOFF sources (decoded) |
//! | `woff`  | ttf/otf sources        |
//! | `eot`   | ttf/otf/woff sources   |
//! | `woff2` | ttf/otf/woff sources   |
//!
//! Sources are always copied. `ttf` keeps the flavor of the font, so a CFF
//! font decodes to `.otf`. SVG fonts are not generated.

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFormat {
    Sfnt,
    Woff,
    Eot,
    Woff2,
}

impl FontFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ttf" | "otf" | "sfnt" => Some(Self::Sfnt),
            "woff" => Some(Self::Woff),
            "eot" => Some(Self::Eot),
            "woff2" => Some(Self::Woff2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    pub formats: Vec<String>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            formats: vec!["ttf".into(), "woff".into(), "eot".into(), "woff2".into()],
        }
    }
}

impl FontsConfig {
    /// Known formats, unknown names dropped (they fail validation).
    pub fn derived(&self) -> Vec<FontFormat> {
        let mut out: Vec<FontFormat> = Vec::new();
        for format in self.formats.iter().filter_map(|f| FontFormat::parse(f)) {
            if !out.contains(&format) {
                out.push(format);
            }
        }
        out
    }

    pub fn wants(&self, format: FontFormat) -> bool {
        self.derived().contains(&format)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for name in &self.formats {
            if FontFormat::parse(name).is_none() {
                diag.error_with_hint(
                    "build.fonts.formats",
                    format!("unknown font format `{name}`"),
                    "use ttf, woff, eot or woff2 (svg fonts are not generated)",
                );
            }
        }
    }
}
