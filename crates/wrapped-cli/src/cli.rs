//! CLI argument parsing for ai-wrapped.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// AI Wrapped
///
/// Your year in AI conversations, from a ChatGPT or Claude data export.
#[derive(Parser, Debug)]
#[command(name = "ai-wrapped")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/ai-wrapped/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable story
    Text,
    /// Full report as JSON
    Json,
}

/// Commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze an export file and print the story
    Analyze {
        /// Export file (conversations.json)
        file: PathBuf,

        /// Export platform (ChatGPT or Claude)
        #[arg(short, long, default_value = "ChatGPT")]
        platform: String,

        /// Skip the text-generation service and use static text
        #[arg(long)]
        offline: bool,

        /// Seed for persona fallback, sampling and trivia
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Decode a share token and print the analytics as JSON
    Decode {
        /// Token produced by `analyze`
        token: String,
    },

    /// List every persona, most common first
    Personas,
}
