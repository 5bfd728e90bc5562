use anyhow::Result;
use clap::Parser;
use log::info;

use dynamics_activity_tools::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Progress and skip warnings go to stderr; RUST_LOG overrides the level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();
    info!("Starting dynamics-activity-tools");

    cli.command.run().await
}
