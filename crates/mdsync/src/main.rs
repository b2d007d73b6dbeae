//! mdsync CLI - Diagram synchronizer for markdown trees.
//!
//! Provides commands for:
//! - `sync`: Render diagram blocks in markdown files to images

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::SyncArgs;
use output::Output;

/// mdsync - Diagram synchronizer for markdown trees.
#[derive(Parser)]
#[command(name = "mdsync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render diagram blocks to images and rewrite the documents.
    Sync(SyncArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --debug enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let debug = matches!(&cli.command, Commands::Sync(args) if args.debug);
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Sync(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
