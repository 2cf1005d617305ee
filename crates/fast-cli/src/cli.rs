//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{correct::CorrectArgs, history::HistoryArgs, start::StartArgs};

/// Intermittent-fasting tracker.
///
/// Tracks a single running fast and derives elapsed time, remaining time,
/// and goal progress for every surface that asks.
#[derive(Debug, Parser)]
#[command(name = "fast", version, about, long_about = None)]
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
    /// Start a fast.
    Start(StartArgs),

    /// Stop the running fast.
    Stop,

    /// Show the current fast.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Emit the precomputed refresh timeline for glanceable surfaces.
    Timeline {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show completed fasts and summary statistics.
    History(HistoryArgs),

    /// Rewrite a session's recorded times and goal.
    Correct(CorrectArgs),

    /// Delete a session.
    Delete {
        /// Session ID to delete.
        id: String,
    },
}
