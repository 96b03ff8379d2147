//! Mock generator for testing and offline runs.

use async_trait::async_trait;

use wrapped_analytics::word_frequency;
use wrapped_types::{Message, Persona};

use super::{GenerationError, TextGenerator, TopicSummary};

/// Mock generator that produces deterministic text from its inputs.
///
/// Useful for testing without making API calls. [`MockGenerator::failing`]
/// fails every call, which drives the story onto its static text.
pub struct MockGenerator {
    fail: bool,
}

impl MockGenerator {
    /// Create a new mock generator.
    pub fn new() -> Self {
        Self { fail: false }
    }

    /// Generator whose every call fails with [`GenerationError::Unavailable`].
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn summarize_topic(&self, messages: &[Message]) -> Result<TopicSummary, GenerationError> {
        if self.fail {
            return Err(GenerationError::Unavailable);
        }
        if messages.is_empty() {
            return Err(GenerationError::EmptySample);
        }

        let stats = word_frequency(messages, 1);
        let Some(top) = stats.top.first() else {
            return Ok(TopicSummary::new(
                "Quiet Thinker",
                format!("You kept it brief across {} messages!", messages.len()),
            ));
        };

        Ok(TopicSummary::new(
            format!("{} Enthusiast", capitalize(&top.text)),
            format!(
                "You came back to {} {} times across {} sampled messages!",
                top.text,
                top.value,
                messages.len()
            ),
        ))
    }

    async fn describe_persona(
        &self,
        persona: &Persona,
        top_words: &[String],
    ) -> Result<String, GenerationError> {
        if self.fail {
            return Err(GenerationError::Unavailable);
        }

        let mut text = format!("Behold, {}! {}.", persona.title, persona.description);
        if !top_words.is_empty() {
            let words = top_words.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
            text.push_str(&format!(" Powered by {words}, nothing can stop you."));
        }
        Ok(text)
    }
}
