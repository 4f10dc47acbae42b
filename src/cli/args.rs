//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Embed a front-end build into firmware as gzip-compressed arrays
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root (default: directory of the config file, or cwd)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Config file path (default: fwembed.toml)
    #[arg(short = 'C', long, global = true, default_value = "fwembed.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the front-end build, then generate the embedded module
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Generate the embedded module from an existing front-end build
    #[command(visible_alias = "e")]
    Embed {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// List the assets and routes that would be embedded, without writing
    #[command(visible_alias = "l")]
    List {
        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },
}

/// Shared arguments for Build and Embed commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Generated module path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Build output directory to embed (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dist: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Generation arguments of the current command, if any.
    pub const fn generate_args(&self) -> Option<&GenerateArgs> {
        match &self.command {
            Commands::Build { args } | Commands::Embed { args } => Some(args),
            Commands::List { .. } => None,
        }
    }

    pub const fn verbose(&self) -> bool {
        match &self.command {
            Commands::Build { args } | Commands::Embed { args } => args.verbose,
            Commands::List { verbose } => *verbose,
        }
    }
}
