//! Tagforge
//!
//! Audits tag management container exports and generates server-side
//! containers from them.

use tagforge_cli::Cli;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::from_env();
    init_tracing(cli.verbose);

    tracing::debug!(version = tagforge_cli::VERSION, "starting");
    tagforge_cli::run(cli)
}

/// Logs go to stderr; stdout carries command output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
