//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Grid carbon intensity estimator.
///
/// Annotates batches of usage intervals with their average grid carbon
/// intensity using the WattTime API.
#[derive(Debug, Parser)]
#[command(name = "gc", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Annotate a batch of usage intervals with grid carbon intensity.
    Estimate {
        /// Input JSON file holding the batch (defaults to stdin).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Pretty-print the annotated output.
        #[arg(long)]
        pretty: bool,
    },
}
