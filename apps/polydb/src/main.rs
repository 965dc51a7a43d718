//! PolyDB - Entry Point

use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use polydb::Cli;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Parse before tracing so --help and --version print cleanly
    let cli = Cli::parse();

    init_tracing(&Environment::from_env());

    polydb::run(cli).await
}
