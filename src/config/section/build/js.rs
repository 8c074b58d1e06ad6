//! Script configuration.
//!
//! ```toml
//! [build.js]
//! target = "es2020"   # es2015 ... es2024 | esnext
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsConfig {
    /// ECMAScript version the bundle is lowered to.
    pub target: String,
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            target: "es2020".into(),
        }
    }
}

pub const SUPPORTED_TARGETS: &[&str] = &[
    "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "es2021", "es2022", "es2023",
    "es2024", "esnext",
];

impl JsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let target = self.target.to_ascii_lowercase();
        if !SUPPORTED_TARGETS.contains(&target.as_str()) {
            diag.error_with_hint(
                "build.js.target",
                format!("unsupported target `{}`", self.target),
                format!("use one of: {}", SUPPORTED_TARGETS.join(", ")),
            );
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
        assert_eq!(config.build.js.target, "es2020");
    }

    #[test]
    fn test_validate_target() {
        let mut diag = ConfigDiagnostics::new();
        JsConfig { target: "ES2020".into() }.validate(&mut diag);
        JsConfig { target: "esnext".into() }.validate(&mut diag);
        assert!(diag.is_empty());

        JsConfig { target: "es3".into() }.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
