//! CLI module for Sporre.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Sporre - Transcript Question Answering
///
/// Ingest video transcripts into a searchable index and ask questions about
/// them. The name "Sporre" comes from the Norwegian word "spørre," meaning
/// "to ask."
#[derive(Parser, Debug)]
#[command(name = "sporre")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a video's transcript into the index
    Ingest {
        /// Video ID to ingest
        video_id: String,
    },

    /// Ask a question about an ingested video
    Ask {
        /// Video ID to ask about
        video_id: String,

        /// The question to ask
        question: String,

        /// LLM model to use for answer generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
