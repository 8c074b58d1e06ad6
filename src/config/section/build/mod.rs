//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! production = false          # Same as passing --production
//! stylesheet = "css"          # Stylesheet variant used by build/watch: css | scss
//!
//! [build.css]
//! webp = true                 # Add `.webp` rules in production
//! targets = { chrome = "87", safari = "14" }
//!
//! [build.js]
//! target = "es2020"
//!
//! [build.images]
//! webp = true                 # Emit a .webp copy of jpg/png sources
//! jpeg_quality = 75
//!
//! [build.fonts]
//! formats = ["ttf", "woff", "woff2"]
//! ```
//!
//! See submodules for detailed options: [`css`], [`js`], [`images`], [`fonts`].

mod css;
mod fonts;
mod images;
mod js;

pub use css::{BrowserTargets, CssConfig, encode_version};
pub use fonts::{FontFormat, FontsConfig};
pub use images::ImagesConfig;
pub use js::JsConfig;

use crate::config::ConfigDiagnostics;
use crate::core::AssetClass;
use serde::{Deserialize, Serialize};

/// Which stylesheet pipeline `build` and `watch` use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylesheetVariant {
    #[default]
    Css,
    Scss,
}

impl StylesheetVariant {
    pub const fn class(self) -> AssetClass {
        match self {
            Self::Css => AssetClass::Styles,
            Self::Scss => AssetClass::Scss,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Production mode: minify, compress images, no source maps.
    pub production: bool,

    pub stylesheet: StylesheetVariant,

    pub css: CssConfig,
    pub js: JsConfig,
    pub images: ImagesConfig,
    pub fonts: FontsConfig,
}

impl BuildSectionConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.css.validate(diag);
        self.js.validate(diag);
        self.images.validate(diag);
        self.fonts.validate(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert!(!config.build.production);
        assert_eq!(config.build.stylesheet, StylesheetVariant::Css);
        assert_eq!(config.build.stylesheet.class(), AssetClass::Styles);
    }

    #[test]
    fn test_scss_variant() {
        let config = test_parse_config("[build]\nproduction = true\nstylesheet = \"scss\"");
        assert!(config.build.production);
        assert_eq!(config.build.stylesheet.class(), AssetClass::Scss);
    }
}
