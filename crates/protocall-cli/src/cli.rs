//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// protocall - resolve protocol-tagged values in configuration documents
#[derive(Parser, Debug)]
#[command(name = "protocall")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a JSON, YAML or TOML document and print the result
    ///
    /// Examples:
    ///   protocall resolve config.json
    ///   protocall resolve app.yaml --base-dir /srv --format yaml
    Resolve {
        /// Document to resolve
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[command(flatten)]
        resolver: ResolverArgs,
    },

    /// List the protocols the resolver understands
    Protocols {
        #[command(flatten)]
        resolver: ResolverArgs,
    },
}

/// Options shared by every command that builds a resolver
#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolverArgs {
    /// Directory relative paths are resolved against (default: the
    /// document's directory, or the working directory)
    #[arg(short, long, env = "PROTOCALL_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Config file (default: ./protocall.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable the glob: protocol
    #[arg(long)]
    pub glob: bool,
}

/// Output format for resolved documents
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
