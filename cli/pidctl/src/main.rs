//! pidman - command-line client for the pidman persistent identifier service
//!
//! Lists and edits domains, mints ARKs and PURLs, manages their targets, and
//! validates ARK strings offline.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod output;

use commands::Cli;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PIDMAN_LOG";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
