use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for recall
#[derive(Debug, Parser)]
#[command(name = "recall", version)]
#[command(about = "Find the transcript chunks most similar to a question", long_about = None)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Command to run; defaults to the interactive session
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options that override the configuration file
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Embedding artifact (.json, .bin or .bincode)
    #[arg(long, global = true)]
    pub vectors: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of results per question
    #[arg(short = 'k', long, global = true)]
    pub top_k: Option<usize>,

    /// Maximum snippet length in characters
    #[arg(long, global = true)]
    pub snippet_chars: Option<usize>,

    /// Ollama embedding model
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Show informational logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive question loop
    Chat,

    /// Answer a single question and exit
    Ask {
        /// The question to search for
        question: String,
    },

    /// Show statistics about the embedding artifact
    Inspect,
}
