//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Iconforge icon-font builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: iconforge.toml)
    #[arg(short = 'C', long, default_value = "iconforge.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the icon font incrementally
    #[command(visible_alias = "b")]
    Build {
        /// Delete the hash record and normalized-icon cache first,
        /// forcing a full rebuild
        #[arg(short, long)]
        clean: bool,

        /// Show unchanged icons and debug details
        #[arg(short, long)]
        verbose: bool,
    },

    /// Delete the hash record, normalized-icon cache and scratch space
    #[command(visible_alias = "c")]
    Clean,
}
