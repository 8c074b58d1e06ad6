//! Image configuration.
//!
//! ```toml
//! [build.images]
//! webp = true          # .webp copy of every jpg/jpeg/png
//! jpeg_quality = 75    # production re-encode quality (1-100)
//! ```
//!
//! `webp` also controls the `<picture>` rewrite in markup, so pages never
//! point at WebP files that were not produced.

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub webp: bool,
    pub jpeg_quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            webp: true,
            jpeg_quality: 75,
        }
    }
}

impl ImagesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error(
                "build.images.jpeg_quality",
                format!("must be between 1 and 100, got {}", self.jpeg_quality),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_images_config() {
        let config = test_parse_config("[build.images]\nwebp = false\njpeg_quality = 60");
        assert!(!config.build.images.webp);
        assert_eq!(config.build.images.jpeg_quality, 60);
    }

    #[test]
    fn test_quality_range() {
        let mut diag = ConfigDiagnostics::new();
        ImagesConfig { webp: true, jpeg_quality: 0 }.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
