//! Command implementations.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use wrapped_analytics::all_personas;
use wrapped_story::{decode_share_token, Step, WrappedPipeline, WrappedReport};
use wrapped_types::{ErrorCategory, Settings, WrappedError};

use crate::cli::OutputFormat;

/// Initialize logging on stderr so stdout stays clean for reports.
///
/// `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load settings and apply CLI overrides, then start logging.
fn load_settings(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    init_logging(&settings.log_level)?;
    debug!(
        utc_offset_minutes = ?settings.utc_offset_minutes,
        provider = %settings.generator.provider,
        "Configuration loaded"
    );
    Ok(settings)
}

/// Analyze an export file.
pub async fn analyze(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    file: &Path,
    platform: &str,
    offline: bool,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level_override)?;
    if seed.is_some() {
        settings.seed = seed;
    }

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read export file {}", file.display()))?;
    info!(file = %file.display(), bytes = raw.len(), "Read export");

    let pipeline = WrappedPipeline::from_settings(&settings, offline)?;
    let report = pipeline.run(&raw, platform).await?;

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => render_text(&report),
    };
    println!("{output}");
    Ok(())
}

/// Decode a share token.
pub fn decode(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
    token: &str,
) -> Result<()> {
    load_settings(config_path, log_level_override)?;
    let analytics = decode_share_token(token)?;
    println!("{}", serde_json::to_string_pretty(&analytics)?);
    Ok(())
}

/// List the persona catalog.
pub fn personas(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<()> {
    load_settings(config_path, log_level_override)?;
    print!("{}", render_personas());
    Ok(())
}

fn render_personas() -> String {
    let mut out = String::new();
    for persona in all_personas() {
        let _ = writeln!(
            out,
            "{:>3}  {} {:<22} {}",
            persona.rarity, persona.icon, persona.title, persona.description
        );
    }
    out
}

/// Plain-text rendering of a report.
pub fn render_text(report: &WrappedReport) -> String {
    let mut out = String::new();

    for (i, step) in report.story.iter().enumerate() {
        let _ = writeln!(out, "── {}. {} ──", i + 1, step.title());
        match step {
            Step::Stat {
                value, description, ..
            } => {
                let _ = writeln!(out, "{value}");
                let _ = writeln!(out, "{description}");
            }
            Step::Chart {
                data, description, ..
            } => {
                let max = data.iter().map(|p| p.count).max().unwrap_or(0).max(1);
                for point in data {
                    let width = point.count * 30 / max;
                    let _ = writeln!(
                        out,
                        "{:>9} {} {}",
                        point.label,
                        "█".repeat(width),
                        point.count
                    );
                }
                let _ = writeln!(out, "{description}");
            }
            Step::Trivia { question, .. } => {
                let _ = writeln!(out, "{}", question.question);
                for (n, option) in question.options.iter().enumerate() {
                    let letter = char::from(b'A' + n as u8);
                    let _ = writeln!(out, "  {letter}) {option}");
                }
                if let Some(answer) = question.correct_answer() {
                    let _ = writeln!(out, "  (answer: {answer})");
                }
            }
            Step::Persona {
                persona_title,
                description,
                ..
            } => {
                let _ = writeln!(out, "{persona_title}");
                let _ = writeln!(out, "{description}");
            }
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Share token: {}", report.share_token);
    out
}

/// User-facing headline for a failed run.
pub fn error_headline(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<WrappedError>().map(WrappedError::category) {
        Some(ErrorCategory::WrongInput) => {
            "This file doesn't look like the export you selected. Check the platform and the file."
        }
        Some(ErrorCategory::NoData) => "There was nothing to analyze in this export.",
        Some(ErrorCategory::Internal) | None => "Oops! Something went wrong.",
    }
}
