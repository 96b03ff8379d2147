//! Export platform selector.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WrappedError;

/// Chat platform an export came from.
///
/// New platforms only need a variant here and a parser; the aggregator
/// carries the value through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Tree-structured `conversations.json` export
    #[serde(rename = "ChatGPT")]
    ChatGpt,
    /// Flat-history export
    #[serde(rename = "Claude")]
    Claude,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 2] = [Platform::ChatGpt, Platform::Claude];

    /// Display name, also used as the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::ChatGpt => "ChatGPT",
            Platform::Claude => "Claude",
        }
    }

    /// Prefix for synthesized conversation ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Platform::ChatGpt => "chatgpt",
            Platform::Claude => "claude",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = WrappedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chatgpt" | "openai" | "gpt" => Ok(Platform::ChatGpt),
            "claude" | "anthropic" => Ok(Platform::Claude),
            other => Err(WrappedError::Configuration(format!(
                "unsupported platform '{other}' (expected one of: ChatGPT, Claude)"
            ))),
        }
    }
}
