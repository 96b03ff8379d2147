//! Configuration loading for ai-wrapped.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/ai-wrapped/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::WrappedError;

/// Largest UTC offset any real timezone uses (UTC+14).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Settings for the external text-generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Provider name ("groq", "openai", "anthropic", "mock", "none")
    #[serde(default = "default_generator_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_generator_model")]
    pub model: String,

    /// API key (usually supplied through the environment)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL override
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-call timeout in seconds; expiry falls back to static text
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_generator_provider() -> String {
    "groq".to_string()
}

fn default_generator_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

fn default_generator_timeout_secs() -> u64 {
    20
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            provider: default_generator_provider(),
            model: default_generator_model(),
            api_key: None,
            api_base_url: None,
            timeout_secs: default_generator_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl GeneratorSettings {
    /// API key from settings, falling back to the provider's usual env var.
    pub fn resolved_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.clone());
        }
        let var = match self.provider.as_str() {
            "groq" => "GROQ_API_KEY",
            "openai" => "OPENAI_API_KEY",
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => return None,
        };
        std::env::var(var).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Offset applied to timestamps before calendar bucketing.
    /// `None` uses the machine's time zone, resolved per message.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    /// Maximum number of user messages sent for topic summarization
    #[serde(default = "default_topic_sample_size")]
    pub topic_sample_size: usize,

    /// Seed for persona fallback, trivia and sampling
    #[serde(default)]
    pub seed: Option<u64>,

    /// Text-generation settings
    #[serde(default)]
    pub generator: GeneratorSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_topic_sample_size() -> usize {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            utc_offset_minutes: None,
            topic_sample_size: default_topic_sample_size(),
            seed: None,
            generator: GeneratorSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/ai-wrapped/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (WRAPPED_*, nested with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, WrappedError> {
        let config_dir = ProjectDirs::from("", "", "ai-wrapped")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| WrappedError::config(e.to_string()))?
            .set_default("topic_sample_size", default_topic_sample_size() as i64)
            .map_err(|e| WrappedError::config(e.to_string()))?
            .set_default("generator.provider", default_generator_provider())
            .map_err(|e| WrappedError::config(e.to_string()))?
            .set_default("generator.model", default_generator_model())
            .map_err(|e| WrappedError::config(e.to_string()))?
            .set_default(
                "generator.timeout_secs",
                default_generator_timeout_secs() as i64,
            )
            .map_err(|e| WrappedError::config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: WRAPPED_LOG_LEVEL, WRAPPED_GENERATOR__PROVIDER, WRAPPED_SEED, etc.
        builder = builder.add_source(
            Environment::with_prefix("WRAPPED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| WrappedError::config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| WrappedError::config(e.to_string()))?;

        settings.validate().map_err(WrappedError::Configuration)?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(offset) = self.utc_offset_minutes {
            if offset.abs() > MAX_UTC_OFFSET_MINUTES {
                return Err(format!(
                    "utc_offset_minutes must be within +/-{MAX_UTC_OFFSET_MINUTES}, got {offset}"
                ));
            }
        }
        if self.topic_sample_size == 0 {
            return Err("topic_sample_size must be > 0".to_string());
        }
        if self.generator.timeout_secs == 0 {
            return Err("generator.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}
