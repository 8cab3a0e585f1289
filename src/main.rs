mod app;
mod config;
mod render;

use anyhow::Result;
use app::App;
use clap::Parser;
use config::{AppConfig, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(os = std::env::consts::OS, arch = std::env::consts::ARCH, "starting");
    App::new(config).run()
}
