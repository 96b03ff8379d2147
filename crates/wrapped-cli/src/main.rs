//! AI Wrapped
//!
//! A "year in review" for your AI chat history.
//!
//! # Usage
//!
//! ```bash
//! ai-wrapped analyze conversations.json --platform ChatGPT [--offline] [--seed N] [--format json]
//! ai-wrapped decode <TOKEN>
//! ai-wrapped personas
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/ai-wrapped/config.toml)
//! 3. File passed with --config
//! 4. Environment variables (WRAPPED_*, nested keys joined with __)
//! 5. CLI flags

use std::process::ExitCode;

use clap::Parser;

use wrapped_cli::{analyze, decode, error_headline, personas, Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    let result = match cli.command {
        Commands::Analyze {
            file,
            platform,
            offline,
            seed,
            format,
        } => analyze(config, log_level, &file, &platform, offline, seed, format).await,
        Commands::Decode { token } => decode(config, log_level, &token),
        Commands::Personas => personas(config, log_level),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_headline(&err));
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
