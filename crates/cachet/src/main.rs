//! Cachet - operator CLI for the encrypted session store
//!
//! Main entry point for the Cachet CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{check, config, keygen};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Cachet - encrypted, cache-backed session store
#[derive(Parser)]
#[command(name = "cachet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new base64 encryption key
    Keygen(keygen::KeygenArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Exercise a session lifecycle against the configured store
    Check(check::CheckArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays scriptable
    let default_filter = if cli.verbose {
        "cachet=debug,cachet_session=debug,cachet_config=debug,info"
    } else {
        "cachet=info,cachet_session=info,cachet_config=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Keygen(args) => keygen::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
        Commands::Check(args) => check::run(args, &ctx).await,
    }
}
