//! Stylesheet configuration.
//!
//! # Example
//!
//! ```toml
//! [build.css]
//! webp = true
//!
//! [build.css.targets]
//! chrome = "87"
//! firefox = "78"
//! safari = "13.1"
//! ```
//!
//! Browser versions decide which vendor prefixes are added and which
//! syntax is lowered. Browsers not listed keep their default version.

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    /// Append `.webp` variants of rules that reference jpg/png images.
    pub webp: bool,
    pub targets: BrowserTargets,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            webp: true,
            targets: BrowserTargets::default(),
        }
    }
}

/// Minimum browser versions, written as `"major"`, `"major.minor"` or
/// `"major.minor.patch"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserTargets {
    pub android: Option<String>,
    pub chrome: Option<String>,
    pub edge: Option<String>,
    pub firefox: Option<String>,
    pub ie: Option<String>,
    pub ios_saf: Option<String>,
    pub opera: Option<String>,
    pub safari: Option<String>,
    pub samsung: Option<String>,
}

impl Default for BrowserTargets {
    fn default() -> Self {
        let v = |s: &str| Some(s.to_string());
        Self {
            android: None,
            chrome: v("87"),
            edge: v("88"),
            firefox: v("78"),
            ie: None,
            ios_saf: v("14"),
            opera: v("73"),
            safari: v("14"),
            samsung: v("14"),
        }
    }
}

impl BrowserTargets {
    /// `(name, version)` pairs for every configured browser.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("android", &self.android),
            ("chrome", &self.chrome),
            ("edge", &self.edge),
            ("firefox", &self.firefox),
            ("ie", &self.ie),
            ("ios_saf", &self.ios_saf),
            ("opera", &self.opera),
            ("safari", &self.safari),
            ("samsung", &self.samsung),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// Encode `"13.1"` the way lightningcss expects: `major << 16 | minor << 8 | patch`.
pub fn encode_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let mut next = |required: bool| -> Option<u32> {
        match parts.next() {
            Some(p) => p.parse::<u8>().ok().map(u32::from),
            None if required => None,
            None => Some(0),
        }
    };
    let major = next(true)?;
    let minor = next(false)?;
    let patch = next(false)?;
    if parts.next().is_some() {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

impl CssConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (name, version) in self.targets.entries() {
            if encode_version(version).is_none() {
                diag.error_with_hint(
                    format!("build.css.targets.{name}"),
                    format!("invalid browser version `{version}`"),
                    "use a version like \"87\" or \"13.1\"",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert!(config.build.css.webp);
        assert_eq!(config.build.css.targets.chrome.as_deref(), Some("87"));
        assert!(config.build.css.targets.ie.is_none());
    }

    #[test]
    fn test_targets_override() {
        let config = test_parse_config("[build.css.targets]\nie = \"11\"\nchrome = \"100\"");
        let entries = config.build.css.targets.entries();
        assert!(entries.contains(&("ie", "11")));
        assert!(entries.contains(&("chrome", "100")));
        assert!(entries.contains(&("firefox", "78")));
    }

    #[test]
    fn test_encode_version() {
        assert_eq!(encode_version("87"), Some(87 << 16));
        assert_eq!(encode_version("13.1"), Some((13 << 16) | (1 << 8)));
        assert_eq!(encode_version("12.2.3"), Some((12 << 16) | (2 << 8) | 3));
        assert_eq!(encode_version("abc"), None);
        assert_eq!(encode_version("1.2.3.4"), None);
    }

    #[test]
    fn test_validate_bad_version() {
        let mut config = CssConfig::default();
        config.targets.safari = Some("latest".into());
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
