//! fwembed - embed a front-end build into firmware.
//!
//! Runs the front-end build, gzips every file of its output directory and
//! writes one C++ module holding the compressed arrays plus a setup function
//! that registers a GET route per file on the embedded web server.

mod asset;
mod cli;
mod codegen;
mod config;
mod error;
mod logger;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::EmbedConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = EmbedConfig::load(&cli)?;

    let result = match &cli.command {
        Commands::Build { .. } => cli::build::generate_module(&config, true).map(|_| ()),
        Commands::Embed { .. } => cli::build::generate_module(&config, false).map(|_| ()),
        Commands::List { .. } => cli::build::list_assets(&config),
    };

    // Non-zero exit tells the outer build to stop before compiling a stale module
    if let Err(err) = result {
        log!("error"; "{}", err.report());
        std::process::exit(err.exit_code());
    }
    Ok(())
}
