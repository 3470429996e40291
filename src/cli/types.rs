//! CLI type definitions: clap command structures for the `praxis` binary.

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "praxis")]
#[command(about = "Hierarchical cognitive agent scheduler", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a praxis.yaml config file (defaults to ./praxis.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a directive and drive it to completion, streaming progress
    Submit {
        /// The natural-language directive
        directive: String,

        /// Override the configured max_cycles
        #[arg(long)]
        max_cycles: Option<u32>,

        /// Pin a specific model for this campaign
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the current state of a campaign
    Status {
        campaign_id: Uuid,
    },

    /// Signal a running campaign to abandon at the next safe point
    Cancel {
        campaign_id: Uuid,
    },
}
