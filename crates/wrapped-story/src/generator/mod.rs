//! Generative-text collaborator.
//!
//! The story composer asks for two pieces of text: a topic summary of a
//! sample of user messages and a celebratory persona description. Both are
//! optional garnish; callers substitute static text when a call fails.

mod api;
mod mock;

pub use api::{extract_json, strip_markdown, ApiGenerator, ApiGeneratorConfig};
pub use mock::MockGenerator;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use wrapped_types::{GeneratorSettings, Message, Persona};

/// Error type for text generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("No user messages to analyze")]
    EmptySample,

    #[error("Text generation is unavailable")]
    Unavailable,
}

/// Dominant theme of a message sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Two or three word title, e.g. "Future Financier"
    pub title: String,

    /// One fun sentence about the theme
    pub insight: String,
}

impl TopicSummary {
    pub const FALLBACK_TITLE: &'static str = "Deep Thinker";

    /// Create a new summary.
    pub fn new(title: impl Into<String>, insight: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            insight: insight.into(),
        }
    }

    /// Static text used when generation fails.
    pub fn fallback() -> Self {
        Self::new(
            Self::FALLBACK_TITLE,
            "You explored a wide variety of fascinating subjects in your conversations!",
        )
    }
}

/// Static persona text used when generation fails.
pub fn fallback_persona_description(persona: &Persona) -> String {
    format!(
        "You're {}! {} Your conversations are truly one-of-a-kind, shaping the digital cosmos with every word.",
        persona.title, persona.description
    )
}

/// Pluggable text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Identify a dominant theme in the sampled user messages.
    ///
    /// Fails with [`GenerationError::EmptySample`] without calling out when
    /// `messages` is empty.
    async fn summarize_topic(&self, messages: &[Message]) -> Result<TopicSummary, GenerationError>;

    /// Describe the persona in two or three celebratory sentences.
    async fn describe_persona(
        &self,
        persona: &Persona,
        top_words: &[String],
    ) -> Result<String, GenerationError>;
}

/// Build the generator selected by settings.
///
/// `offline` (or provider `none`) yields a generator that always fails, so
/// the story uses static text. API providers without a key degrade the same
/// way with a warning.
pub fn from_settings(
    settings: &GeneratorSettings,
    offline: bool,
) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    if offline {
        info!("Offline mode, story will use static text");
        return Ok(Arc::new(MockGenerator::failing()));
    }

    match settings.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockGenerator::new())),
        "none" => Ok(Arc::new(MockGenerator::failing())),
        "groq" | "openai" | "anthropic" => match settings.resolved_api_key() {
            Some(key) => {
                let config = ApiGeneratorConfig::from_settings(settings, key)?;
                info!(provider = %settings.provider, model = %config.model, "Using API text generator");
                Ok(Arc::new(ApiGenerator::new(config)?))
            }
            None => {
                warn!(
                    provider = %settings.provider,
                    "No API key configured, story will use static text"
                );
                Ok(Arc::new(MockGenerator::failing()))
            }
        },
        other => Err(GenerationError::ConfigError(format!(
            "unknown generator provider '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_texts() {
        let summary = TopicSummary::fallback();
        assert_eq!(summary.title, "Deep Thinker");

        let persona = Persona::new("The Debugger", "A problem solver.", "🐛");
        assert_eq!(
            fallback_persona_description(&persona),
            "You're The Debugger! A problem solver. Your conversations are truly one-of-a-kind, shaping the digital cosmos with every word."
        );
    }

    #[tokio::test]
    async fn test_offline_generator_always_fails() {
        let generator = from_settings(&GeneratorSettings::default(), true).unwrap();
        let persona = Persona::new("The Echo", "", "🎯");
        let err = generator.describe_persona(&persona, &[]).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable));
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let settings = GeneratorSettings {
            provider: "mock".to_string(),
            ..Default::default()
        };
        let generator = from_settings(&settings, false).unwrap();
        let persona = Persona::new("The Echo", "Balanced.", "🎯");
        let text = generator
            .describe_persona(&persona, &["rust".to_string()])
            .await
            .unwrap();
        assert!(text.contains("The Echo"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let settings = GeneratorSettings {
            provider: "bard".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            from_settings(&settings, false),
            Err(GenerationError::ConfigError(_))
        ));
    }
}
