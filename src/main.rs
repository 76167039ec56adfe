//! Iconforge - an incremental SVG icon-font builder for embedded LVGL UIs.

#![allow(dead_code)]

mod cache;
mod cli;
mod config;
mod font;
mod freshness;
mod logger;
mod normalize;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::IconConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = IconConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Build { clean, verbose } => {
            logger::set_verbose(*verbose);
            if *clean {
                cli::clean_caches(&config)?;
            }
            pipeline::run(&config).map(|_| ())
        }
        Commands::Clean => cli::clean_caches(&config),
    }
}
