//! Build mode flags.

/// Production vs development switches, derived once from the CLI/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Minify markup, stylesheets and scripts.
    pub minify: bool,

    /// Emit `.map` files next to stylesheets and scripts.
    pub source_maps: bool,

    /// Recompress original images.
    pub compress_images: bool,
}

impl BuildMode {
    /// Production mode: optimized output, no debug metadata.
    pub const PRODUCTION: Self = Self {
        minify: true,
        source_maps: false,
        compress_images: true,
    };

    /// Development mode: readable output with source maps.
    pub const DEVELOPMENT: Self = Self {
        minify: false,
        source_maps: true,
        compress_images: false,
    };

    pub const fn from_production(production: bool) -> Self {
        if production {
            Self::PRODUCTION
        } else {
            Self::DEVELOPMENT
        }
    }

    #[inline]
    pub const fn is_production(&self) -> bool {
        self.minify
    }

    pub const fn label(&self) -> &'static str {
        if self.is_production() {
            "production"
        } else {
            "development"
        }
    }
}
