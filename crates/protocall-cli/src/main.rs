//! protocall CLI
//!
//! Resolves protocol-tagged values (`env:`, `path:`, `file:`, ...) in a
//! configuration document and prints the result.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir()?;
    match cli.command {
        Commands::Resolve {
            file,
            format,
            resolver,
        } => commands::run_resolve(&cwd, &file, format, &resolver).await,
        Commands::Protocols { resolver } => commands::run_protocols(&cwd, &resolver),
    }
}

/// Log to stderr, honouring `RUST_LOG` unless `--verbose` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::debug!("Tracing initialised");
    }
}
