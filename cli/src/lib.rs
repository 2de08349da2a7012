//! Command-line front end for the image-processor crate.
//!
//! `grid` composes batches into one padded mosaic; `label` draws a text box
//! onto every image of a batch. Configuration comes from `.env`, process
//! environment variables and an optional JSON style preset.

pub mod cli;
pub mod commands;
pub mod config;
pub mod io;

use cli::{Cli, Command};

/// Run a parsed command line with the given configuration.
pub fn run(cli: &Cli, config: &config::AppConfig) -> anyhow::Result<()> {
    let written = match &cli.command {
        Command::Grid(args) => commands::run_grid(args)?,
        Command::Label(args) => commands::run_label(args, config)?,
    };
    tracing::info!(files = written.len(), "Done");
    Ok(())
}
