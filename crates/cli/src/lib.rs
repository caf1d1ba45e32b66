//! # Tagforge CLI
//!
//! Command-line interface for Tagforge.
//!
//! ## Commands
//!
//! - `analyze` - Audit a container export and print issues, scores and suggestions
//! - `generate` - Generate a server container from a client container
//! - `patch-client` - Point a client container's GA4 tags at a server container
//! - `info` - Display information about a container export
//!

pub mod commands;
pub mod config;

pub use config::TagforgeConfig;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagforge_ir::Vendor;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

/// Audit tag management containers and generate server-side containers.
#[derive(Debug, Parser)]
#[command(name = "tagforge", version, about)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file with [audit] and [generator] tables
    #[arg(short, long, global = true, env = "TAGFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit a container export
    Analyze {
        /// Container export JSON
        container: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Run a rule that is disabled by default
        #[arg(long = "enable", value_name = "RULE")]
        enable: Vec<String>,

        /// Skip a rule
        #[arg(long = "disable", value_name = "RULE")]
        disable: Vec<String>,
    },

    /// Generate a server container
    Generate {
        /// Client container export JSON
        container: PathBuf,

        /// Where to write the server container
        #[arg(short, long)]
        output: PathBuf,

        /// Migration analysis JSON; derived from the container when omitted
        #[arg(long)]
        analysis: Option<PathBuf>,

        /// Template catalogue JSON keyed by vendor
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Only migrate these vendors
        #[arg(long = "vendor", value_name = "VENDOR")]
        vendors: Vec<Vendor>,

        /// Server container URL
        #[arg(long)]
        transport_url: Option<String>,

        /// Also write the patched client container here
        #[arg(long)]
        client_output: Option<PathBuf>,

        /// Print the generation summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Point a client container's GA4 tags at a server container
    PatchClient {
        /// Client container export JSON
        container: PathBuf,

        /// Where to write the patched container
        #[arg(short, long)]
        output: PathBuf,

        /// Server container URL
        #[arg(long)]
        transport_url: Option<String>,
    },

    /// Show what a container holds
    Info {
        /// Container export JSON
        container: PathBuf,
    },
}

impl Cli {
    /// Parse the process arguments
    pub fn from_env() -> Self {
        Self::parse()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze {
            container,
            json,
            enable,
            disable,
        } => commands::analyze(
            &config,
            &commands::AnalyzeArgs {
                container,
                json,
                enable,
                disable,
            },
        ),
        Command::Generate {
            container,
            output,
            analysis,
            catalog,
            vendors,
            transport_url,
            client_output,
            json,
        } => commands::generate(
            &config,
            &commands::GenerateArgs {
                container,
                output,
                analysis,
                catalog,
                vendors,
                transport_url,
                client_output,
                json,
            },
        ),
        Command::PatchClient {
            container,
            output,
            transport_url,
        } => commands::patch_client(&config, &container, &output, transport_url.as_deref()),
        Command::Info { container } => commands::info(&container),
    }
}
