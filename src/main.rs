//! Kiln - a static-site asset pipeline with a live-reload dev server.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod image;
mod logger;
mod orchestrator;
mod pipeline;
mod reload;
mod task;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{SiteConfig, init_config};
use task::Task;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(SiteConfig::load(&cli)?);

    let ok = match cli.resolve_command(config.build.production) {
        Commands::Build => cli::build::build(&config),
        Commands::Clear => cli::build::run_task(Task::Clean, &config),
        Commands::Watch => cli::watch::watch(config).map(|()| true)?,
        Commands::Dev { .. } => cli::watch::dev(config).map(|()| true)?,
        single => match single.asset_class() {
            Some(class) => cli::build::run_task(Task::Asset(class), &config),
            None => true,
        },
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
