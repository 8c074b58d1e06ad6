//! `[paths]` section configuration.
//!
//! Every asset class starts from the default layout below. A table only
//! needs the keys it changes:
//!
//! ```toml
//! [paths]
//! clean = "dist"
//!
//! [paths.html]
//! src = ["src/*.html", "!src/_*.html"]
//! dest = "dist"
//! watch = ["src/**/*.html"]
//!
//! [paths.img]
//! dest = "public/img"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::AssetClass;

/// Partial override for one asset class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassPathsOverride {
    pub src: Option<Vec<String>>,
    pub dest: Option<PathBuf>,
    pub watch: Option<Vec<String>>,
}

/// Fully resolved patterns for one asset class, still relative to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPaths {
    pub src: Vec<String>,
    pub dest: PathBuf,
    pub watch: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory removed by `clear` and before every build.
    pub clean: Option<PathBuf>,
    pub html: ClassPathsOverride,
    pub js: ClassPathsOverride,
    pub css: ClassPathsOverride,
    pub scss: ClassPathsOverride,
    pub img: ClassPathsOverride,
    pub fonts: ClassPathsOverride,
}

pub const DEFAULT_CLEAN: &str = "dist";

const IMG_SRC: &str = "src/img/**/*.{jpg,png,svg,gif,ico,jpeg}";
const IMG_WATCH: &str = "src/img/**/*.{jpg,png,svg,gif,ico,webp,jpeg}";
const FONTS_SRC: &str = "src/fonts/**/*.{eot,ttf,otf,otc,ttc,woff,woff2,svg}";

impl PathsConfig {
    pub fn clean_dir(&self) -> PathBuf {
        self.clean
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLEAN))
    }

    fn override_for(&self, class: AssetClass) -> &ClassPathsOverride {
        match class {
            AssetClass::Markup => &self.html,
            AssetClass::Scripts => &self.js,
            AssetClass::Styles => &self.css,
            AssetClass::Scss => &self.scss,
            AssetClass::Images => &self.img,
            AssetClass::Fonts => &self.fonts,
        }
    }

    /// Default layout merged with the user's overrides.
    pub fn resolve(&self, class: AssetClass) -> ClassPaths {
        let defaults = default_paths(class);
        let user = self.override_for(class);
        ClassPaths {
            src: user.src.clone().unwrap_or(defaults.src),
            dest: user.dest.clone().unwrap_or(defaults.dest),
            watch: user.watch.clone().unwrap_or(defaults.watch),
        }
    }
}

fn strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| (*p).to_string()).collect()
}

pub fn default_paths(class: AssetClass) -> ClassPaths {
    let (src, dest, watch): (&[&str], &str, &[&str]) = match class {
        AssetClass::Markup => (&["src/*.html", "!src/_*.html"], "dist", &["src/**/*.html"]),
        AssetClass::Scripts => (&["src/js/*.js"], "dist/js", &["src/js/**/*.js"]),
        AssetClass::Styles => (&["src/css/style.css"], "dist/css", &["src/css/**/*.css"]),
        AssetClass::Scss => (&["src/scss/main.scss"], "dist/css", &["src/scss/**/*.scss"]),
        AssetClass::Images => (&[IMG_SRC], "dist/img", &[IMG_WATCH]),
        AssetClass::Fonts => (&[FONTS_SRC], "dist/fonts", &[FONTS_SRC]),
    };
    ClassPaths {
        src: strings(src),
        dest: PathBuf::from(dest),
        watch: strings(watch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        let html = config.paths.resolve(AssetClass::Markup);
        assert_eq!(html.src, vec!["src/*.html", "!src/_*.html"]);
        assert_eq!(html.dest, PathBuf::from("dist"));
        assert_eq!(config.paths.clean_dir(), PathBuf::from("dist"));

        let fonts = config.paths.resolve(AssetClass::Fonts);
        assert_eq!(fonts.src, fonts.watch);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = test_parse_config("[paths.img]\ndest = \"public/img\"");
        let img = config.paths.resolve(AssetClass::Images);
        assert_eq!(img.dest, PathBuf::from("public/img"));
        assert_eq!(img.src, vec![IMG_SRC]);
        assert_eq!(img.watch, vec![IMG_WATCH]);
    }

    #[test]
    fn test_clean_override() {
        let config = test_parse_config("[paths]\nclean = \"public\"");
        assert_eq!(config.paths.clean_dir(), PathBuf::from("public"));
    }
}
