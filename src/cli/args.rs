//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::core::AssetClass;

/// Kiln static-site asset pipeline CLI
///
/// Without a command, runs `build` in production mode and `dev` otherwise.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Production build: minify, compress images, no source maps
    #[arg(short, long, global = true)]
    pub production: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Delete the output directory
    Clear,

    /// Build markup (includes, WebP rewrite, minify)
    Html,

    /// Build plain CSS into style.css and style.min.css
    Css,

    /// Compile SCSS into style.css and style.min.css
    Scss,

    /// Bundle scripts
    Js,

    /// Convert and compress images
    Img,

    /// Convert fonts to web formats
    Fonts,

    /// Rebuild on file changes (no server)
    #[command(visible_alias = "w")]
    Watch,

    /// Clean, then run every task
    #[command(visible_alias = "b")]
    Build,

    /// Build, then watch and serve with live reload
    #[command(visible_alias = "d")]
    Dev {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Commands {
    /// Single-task commands map to their asset class.
    pub const fn asset_class(&self) -> Option<AssetClass> {
        match self {
            Self::Html => Some(AssetClass::Markup),
            Self::Css => Some(AssetClass::Styles),
            Self::Scss => Some(AssetClass::Scss),
            Self::Js => Some(AssetClass::Scripts),
            Self::Img => Some(AssetClass::Images),
            Self::Fonts => Some(AssetClass::Fonts),
            Self::Clear | Self::Watch | Self::Build | Self::Dev { .. } => None,
        }
    }
}

impl Cli {
    /// Command to run, with the default chosen from the final build mode.
    pub fn resolve_command(&self, production: bool) -> Commands {
        match &self.command {
            Some(cmd) => cmd.clone(),
            None if production => Commands::Build,
            None => Commands::Dev {
                interface: None,
                port: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kiln").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_command_depends_on_mode() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.resolve_command(true), Commands::Build);
        assert!(matches!(cli.resolve_command(false), Commands::Dev { .. }));
    }

    #[test]
    fn test_global_flags_after_command() {
        let cli = parse(&["css", "--production", "-v"]);
        assert_eq!(cli.command, Some(Commands::Css));
        assert!(cli.production);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
    }

    #[test]
    fn test_dev_overrides() {
        let cli = parse(&["dev", "--interface", "0.0.0.0", "--port", "8080"]);
        match cli.command {
            Some(Commands::Dev { interface, port }) => {
                assert_eq!(interface, Some("0.0.0.0".parse().unwrap()));
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_asset_class_commands() {
        assert_eq!(Commands::Img.asset_class(), Some(AssetClass::Images));
        assert_eq!(Commands::Scss.asset_class(), Some(AssetClass::Scss));
        assert_eq!(Commands::Build.asset_class(), None);
    }

    #[test]
    fn test_config_path_flag() {
        let cli = parse(&["-C", "site/kiln.toml", "build"]);
        assert_eq!(cli.config, PathBuf::from("site/kiln.toml"));
    }
}
