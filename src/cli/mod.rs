//! CLI module for Spol.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Spol - Video Question Answering with Cited Timestamps
///
/// A local-first CLI tool for asking questions about video content.
/// The name "Spol" comes from the Norwegian word for "rewind."
#[derive(Parser, Debug)]
#[command(name = "spol")]
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
    /// Initialize Spol and write the default configuration
    Init,

    /// Transcribe, segment, and index a video's audio
    Process {
        /// Path to the audio file to process
        source: String,
    },

    /// Ask a question about a processed video
    Ask {
        /// Video ID (as reported by `process`)
        video_id: String,

        /// The question to ask
        question: String,

        /// Number of candidates fetched by the coarse vector search
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Number of reranked results kept for the answer
        #[arg(short = 'r', long, default_value = "3")]
        rerank_top_k: usize,
    },

    /// Check whether a video has been processed and indexed
    Status {
        /// Video ID to check
        video_id: String,
    },

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
