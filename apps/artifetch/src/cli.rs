//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// artifetch - fetch remote artifacts into local directories
#[derive(Parser)]
#[command(name = "artifetch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch remote artifacts into local directories, atomically and in parallel")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate Fetchfile
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and install every artifact in the Fetchfile
    #[command(alias = "dl")]
    Download {
        /// Download artifacts in parallel
        #[arg(long)]
        parallel: bool,

        /// Only fetch artifacts whose name starts with this prefix
        #[arg(long, value_name = "NAME")]
        prefix: Option<String>,
    },

    /// Show the artifacts that would be fetched
    #[command(alias = "ls")]
    List {
        /// Only list artifacts whose name starts with this prefix
        #[arg(long, value_name = "NAME")]
        prefix: Option<String>,
    },
}
