use anyhow::Result;
use clap::Parser;
use corank::cli;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // RUST_LOG wins over the flag when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Err(e) = cli::run(args) {
        error!("Main execution failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
