//! Project configuration for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # [build] and sub-sections
//! │   ├── paths      # [paths]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── handle     # Global config handle
//! ├── registry.rs    # Compiled path registry
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section          | Purpose                                           |
//! |------------------|---------------------------------------------------|
//! | `[paths]`        | Source globs, output dirs, watch globs per class  |
//! | `[build]`        | Production flag, stylesheet variant, per-class    |
//! | `[serve]`        | Development server (interface, ports)             |
//!
//! A missing `kiln.toml` is not an error: the defaults describe the usual
//! `src/` → `dist/` layout, rooted at the working directory.

mod registry;
pub mod section;
pub mod types;

pub use registry::{ClassEntry, PathRegistry};
pub use section::{BuildSectionConfig, FontFormat, PathsConfig, ServeConfig, StylesheetVariant};
pub use types::{ConfigDiagnostics, ConfigError, cfg, init_config};

use crate::cli::{Cli, Commands};
use crate::core::BuildMode;
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (may not exist)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory: parent of the config file, or cwd
    #[serde(skip)]
    pub root: PathBuf,

    /// Compiled `[paths]`, filled in by `finalize`
    #[serde(skip)]
    pub registry: PathRegistry,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. Without one, defaults
    /// apply and the working directory is the project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = config_path;
        config.apply_cli(cli);
        config.finalize(&root)?;
        Ok(config)
    }

    /// CLI flags win over file values.
    fn apply_cli(&mut self, cli: &Cli) {
        if cli.production {
            self.build.production = true;
        }
        if let Some(Commands::Dev { interface, port }) = &cli.command {
            if let Some(interface) = interface {
                self.serve.interface = *interface;
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
        }
    }

    /// Set the root, compile the registry and validate everything at once.
    pub fn finalize(&mut self, root: &Path) -> Result<(), ConfigError> {
        self.root = root.to_path_buf();

        let mut diag = ConfigDiagnostics::new();
        self.registry = PathRegistry::build(&self.paths, root, &mut diag);
        self.build.validate(&mut diag);
        diag.into_result()
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) =
            Self::parse_with_ignored(&content).map_err(ConfigError::Toml)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Build mode derived from the final production flag.
    pub const fn mode(&self) -> BuildMode {
        BuildMode::from_production(self.build.production)
    }
}

/// Find config file by searching upward from current directory
///
/// ```text
/// /home/user/site/src/css/   ← cwd
/// /home/user/site/kiln.toml  ← found
/// ```
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

// ============================================================================
// test helpers
// ============================================================================

/// Parse a config snippet, failing the test on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Finalized config rooted at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> SiteConfig {
    let mut config = test_parse_config(content);
    config.finalize(root).unwrap();
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AssetClass;
    use clap::Parser;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::parse_with_ignored("[build\nproduction = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nproduction = true\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(config.build.production);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["kiln", "-p", "dev", "--port", "9000"]);
        let mut config = test_parse_config("[serve]\nport = 4000");
        config.apply_cli(&cli);
        assert!(config.build.production);
        assert_eq!(config.serve.port, 9000);
        assert!(config.mode().is_production());
    }

    #[test]
    fn test_production_from_file_is_kept() {
        let cli = Cli::parse_from(["kiln", "build"]);
        let mut config = test_parse_config("[build]\nproduction = true");
        config.apply_cli(&cli);
        assert!(config.build.production);
    }

    #[test]
    fn test_finalize_builds_registry() {
        let config = test_config_at(Path::new("/site"), "");
        let css = config.registry.get(AssetClass::Styles).unwrap();
        assert_eq!(css.dest, PathBuf::from("/site/dist/css"));
    }

    #[test]
    fn test_finalize_collects_all_errors() {
        let mut config = test_parse_config(
            "[build.images]\njpeg_quality = 0\n[build.fonts]\nformats = [\"svg\"]\n[build.js]\ntarget = \"es3\"",
        );
        match config.finalize(Path::new("/site")) {
            Err(ConfigError::Validation(diag)) => assert_eq!(diag.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
