//! API-based generator using OpenAI-compatible or Anthropic endpoints.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use wrapped_types::{GeneratorSettings, Message, Persona};

use super::{GenerationError, TextGenerator, TopicSummary};

/// Default insight when the model returns a title but no insight.
const DEFAULT_INSIGHT: &str = "You explored fascinating subjects in your conversations!";

/// Number of top words included in the persona prompt.
const PERSONA_PROMPT_WORDS: usize = 10;

/// Configuration for the API generator.
#[derive(Debug, Clone)]
pub struct ApiGeneratorConfig {
    /// API base URL (e.g., "https://api.groq.com/openai/v1")
    pub base_url: String,

    /// Model to use
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion length cap
    pub max_tokens: u32,
}

impl ApiGeneratorConfig {
    fn with_base(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(20),
            temperature: 0.7,
            max_tokens: 500,
        }
    }

    /// Create config for the Groq OpenAI-compatible API.
    pub fn groq(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base("https://api.groq.com/openai/v1", api_key, model)
    }

    /// Create config for OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base("https://api.openai.com/v1", api_key, model)
    }

    /// Create config for Claude API.
    pub fn claude(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base("https://api.anthropic.com/v1", api_key, model)
    }

    /// Create config from generator settings and a resolved key.
    pub fn from_settings(
        settings: &GeneratorSettings,
        api_key: String,
    ) -> Result<Self, GenerationError> {
        let mut config = match settings.provider.to_lowercase().as_str() {
            "groq" => Self::groq(api_key, settings.model.clone()),
            "openai" => Self::openai(api_key, settings.model.clone()),
            "anthropic" => Self::claude(api_key, settings.model.clone()),
            other => {
                return Err(GenerationError::ConfigError(format!(
                    "provider '{other}' is not an API provider"
                )))
            }
        };
        if let Some(base_url) = settings.api_base_url.as_ref().filter(|u| !u.is_empty()) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        config.timeout = Duration::from_secs(settings.timeout_secs);
        config.temperature = settings.temperature;
        config.max_tokens = settings.max_tokens;
        Ok(config)
    }

    fn is_anthropic(&self) -> bool {
        self.base_url.contains("anthropic")
    }
}

/// API-based generator implementation. Makes exactly one request per call.
pub struct ApiGenerator {
    client: Client,
    config: ApiGeneratorConfig,
}

impl ApiGenerator {
    /// Create a new API generator.
    pub fn new(config: ApiGeneratorConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build prompt for topic summarization.
    fn build_topic_prompt(&self, messages: &[Message]) -> String {
        let sample = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n");
        let generation_id = generation_id();

        format!(
            r#"You are an AI analyzing chat history for a "Spotify Wrapped" style summary.
Analyze the following user messages to identify a single, dominant, and interesting theme or topic.
Based on the topic, create a short, fun, one-sentence insight.

Generation ID: {generation_id} - Please ensure this response is unique and creative.

The user's messages are:
---
{sample}
---
Respond in JSON format with two keys: "title" (a 2-3 word title for the topic, e.g., "Creative Wordsmith") and "insight" (the fun, one-sentence summary).
Example Response:
{{
  "title": "Future Financier",
  "insight": "You've got money on your mind, frequently exploring topics about investing, saving, and the economy!"
}}"#
        )
    }

    /// Build prompt for the persona description.
    fn build_persona_prompt(&self, persona: &Persona, top_words: &[String]) -> String {
        let words = top_words
            .iter()
            .take(PERSONA_PROMPT_WORDS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let generation_id = generation_id();

        format!(
            r#"You are a witty and bombastic announcer for an "AI Wrapped" experience. Based on the following user persona and their most used words in AI chats, generate a fun, over-the-top, and flattering personality description. Keep it to 2-3 short, impactful sentences. Be creative and celebratory.

IMPORTANT: Do NOT use markdown formatting like ** or __. Return plain text only.

Generation ID: {generation_id}

User Persona:
- Title: "{title}"
- Base Description: "{description}"

Their Top Words:
- {words}

Now, reveal their grand, bombastic persona! Use plain text without markdown formatting."#,
            title = persona.title,
            description = persona.description,
        )
    }

    /// Make a single API request.
    async fn call_api(&self, prompt: &str, json_mode: bool) -> Result<String, GenerationError> {
        debug!(
            model = %self.config.model,
            json_mode,
            prompt_len = prompt.len(),
            "Calling text generation API"
        );

        if self.config.is_anthropic() {
            self.make_anthropic_request(prompt).await
        } else {
            self.make_openai_request(prompt, json_mode).await
        }
    }

    /// Make OpenAI-compatible API request.
    async fn make_openai_request(
        &self,
        prompt: &str,
        json_mode: bool,
    ) -> Result<String, GenerationError> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            messages: Vec<OpenAIMessage<'a>>,
            temperature: f32,
            max_tokens: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_format: Option<OpenAIResponseFormat>,
        }

        #[derive(Serialize)]
        struct OpenAIMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct OpenAIResponseFormat {
            #[serde(rename = "type")]
            format_type: &'static str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: OpenAIMessageResponse,
        }

        #[derive(Deserialize)]
        struct OpenAIMessageResponse {
            #[serde(default)]
            content: Option<String>,
        }

        let request = OpenAIRequest {
            model: &self.config.model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: json_mode.then_some(OpenAIResponseFormat {
                format_type: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() == 429 {
            return Err(GenerationError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError(format!("HTTP {status}: {body}")));
        }

        let response_body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::ParseError("No choices in response".to_string()))
    }

    /// Make Anthropic API request.
    async fn make_anthropic_request(&self, prompt: &str) -> Result<String, GenerationError> {
        #[derive(Serialize)]
        struct AnthropicRequest<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<AnthropicMessage<'a>>,
        }

        #[derive(Serialize)]
        struct AnthropicMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            #[serde(default)]
            text: Option<String>,
        }

        let request = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() == 429 {
            return Err(GenerationError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ApiError(format!("HTTP {status}: {body}")));
        }

        let response_body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        response_body
            .content
            .into_iter()
            .find_map(|c| c.text)
            .ok_or_else(|| GenerationError::ParseError("No content in response".to_string()))
    }

    /// Parse the JSON topic response, defaulting missing fields.
    fn parse_topic(&self, response: &str) -> Result<TopicSummary, GenerationError> {
        #[derive(Deserialize)]
        struct RawTopic {
            #[serde(default)]
            title: Option<String>,
            #[serde(default)]
            insight: Option<String>,
        }

        let json_str = extract_json(response);
        let raw: RawTopic = serde_json::from_str(&json_str).map_err(|e| {
            GenerationError::ParseError(format!("Failed to parse topic JSON: {e}"))
        })?;

        let non_empty = |s: Option<String>| s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(TopicSummary::new(
            non_empty(raw.title).unwrap_or_else(|| TopicSummary::FALLBACK_TITLE.to_string()),
            non_empty(raw.insight).unwrap_or_else(|| DEFAULT_INSIGHT.to_string()),
        ))
    }
}

fn map_send_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::ApiError(e.to_string())
    }
}

/// Random tag that nudges the model away from cached phrasing.
fn generation_id() -> String {
    format!("{:08x}", rand::rng().random::<u32>())
}

/// Extract JSON object from text (handles markdown code blocks).
pub fn extract_json(text: &str) -> String {
    // Check for markdown code block
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    // Check for plain code block
    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim().to_string();
        }
    }

    // Find first { and last }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    text.trim().to_string()
}

/// Remove bold/italic/code markers that models add despite instructions.
pub fn strip_markdown(text: &str) -> String {
    let stripped = text.replace("**", "").replace("__", "").replace('`', "");
    stripped
        .lines()
        .map(|line| line.trim_start_matches('#').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl TextGenerator for ApiGenerator {
    async fn summarize_topic(&self, messages: &[Message]) -> Result<TopicSummary, GenerationError> {
        if messages.is_empty() {
            return Err(GenerationError::EmptySample);
        }

        let prompt = self.build_topic_prompt(messages);
        let response = self.call_api(&prompt, true).await?;
        self.parse_topic(&response)
    }

    async fn describe_persona(
        &self,
        persona: &Persona,
        top_words: &[String],
    ) -> Result<String, GenerationError> {
        let prompt = self.build_persona_prompt(persona, top_words);
        let response = self.call_api(&prompt, false).await?;
        let text = strip_markdown(&response);
        if text.is_empty() {
            return Err(GenerationError::ParseError("Empty persona description".to_string()));
        }
        Ok(text)
    }
}
