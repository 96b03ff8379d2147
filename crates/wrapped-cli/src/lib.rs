//! ai-wrapped CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (analyze, decode, personas)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, OutputFormat};
pub use commands::{analyze, decode, error_headline, init_logging, personas, render_text};
