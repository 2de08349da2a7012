//! gridlabel binary: parses arguments, sets up logging and dispatches.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gridlabel_lib::cli::Cli;
use gridlabel_lib::config::{self, AppConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .init();

    config::load_dotenv();
    let config = AppConfig::load();
    tracing::debug!(fonts_dir = %config.fonts_dir.display(), default_font = %config.default_font, "Configuration loaded");

    gridlabel_lib::run(&cli, &config)
}
