//! Command-line interface definitions.
//!
//! Defines the CLI structure for the node runtime using `clap`. Without a
//! subcommand the node runs in the foreground.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// KGrid node runtime
#[derive(Parser, Debug)]
#[command(name = "kgrid-node")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Shelf directory holding the activation snapshot
    #[arg(long, global = true, value_name = "DIR")]
    pub shelf: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the node (default)
    Run,

    /// List the records stored on the shelf
    Records(RecordsArgs),

    /// Print the object identifier derived from a URI
    Hash(HashArgs),
}

/// Arguments for `kgrid-node records`.
#[derive(Args, Debug)]
pub struct RecordsArgs {
    /// JSON output for scripting
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `kgrid-node hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Canonical object URI
    pub uri: String,
}
