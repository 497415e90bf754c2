//! Main application entry point.

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting Quadrat");

    quadrat_app::run(quadrat_app::Cli::parse())
}
