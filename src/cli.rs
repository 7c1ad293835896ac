//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - Global options and the subcommand to run
//! - [`Command`] - `stats`, `search`, `retrieve` and `ask`
//!
//! # Example
//!
//! ```rust
//! use chatscroll::cli::{Args, Command};
//! use clap::Parser;
//!
//! let args = Args::parse_from(["chatscroll", "-vv", "retrieve", "chat.txt", "lake trip", "-k", "5"]);
//! assert_eq!(args.log_level(), "debug");
//! assert!(matches!(args.command, Command::Retrieve(ref r) if r.k == Some(5)));
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::retrieval::RetrievalMethod;

/// Explore a WhatsApp chat export: statistics, search, and questions
/// answered from the conversation itself.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatscroll")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatscroll stats chat.txt
    chatscroll stats chat.txt --user Alex --json
    chatscroll search chat.txt 'pizza|sushi' --after 2025-01-01 --limit 10
    chatscroll retrieve chat.txt 'when is the lake trip?' -k 5
    chatscroll ask chat.txt 'who is bringing the tent?' --method embedding")]
pub struct Args {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Default log filter for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Activity, per-user and word/emoji statistics
    Stats(StatsArgs),

    /// Case-insensitive regex search over messages, newest first
    Search(SearchArgs),

    /// Print the chunks most relevant to a query
    Retrieve(RetrieveArgs),

    /// Answer a question about the chat with a local Ollama model
    #[cfg(feature = "ollama")]
    Ask(AskArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    /// WhatsApp TXT export
    pub input: PathBuf,

    /// Show statistics for one user only
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// WhatsApp TXT export
    pub input: PathBuf,

    /// Regular expression (case-insensitive)
    pub pattern: String,

    /// Only messages on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// Only messages on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub before: Option<String>,

    /// Only messages from this user
    #[arg(long, value_name = "USER")]
    pub from: Option<String>,

    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RetrieveArgs {
    /// WhatsApp TXT export
    pub input: PathBuf,

    /// Free-text query
    pub query: String,

    /// Number of chunks (overrides the configuration)
    #[arg(short, value_name = "N")]
    pub k: Option<usize>,

    /// Retrieval method (overrides the configuration)
    #[arg(long, value_enum)]
    pub method: Option<RetrievalMethod>,
}

#[cfg(feature = "ollama")]
#[derive(clap::Args, Debug, Clone)]
pub struct AskArgs {
    /// WhatsApp TXT export
    pub input: PathBuf,

    /// Question about the chat
    pub question: String,

    /// Ollama model (defaults to the configured one, then the first installed)
    #[arg(long)]
    pub model: Option<String>,

    /// Number of chunks used as context (overrides the configuration)
    #[arg(short, value_name = "N")]
    pub k: Option<usize>,

    /// Retrieval method (overrides the configuration)
    #[arg(long, value_enum)]
    pub method: Option<RetrievalMethod>,
}
