//! Dual-shape content payloads.
//!
//! Exports store message text either flat or as a list of typed parts. Both
//! shapes are decoded here into plain text; nothing outside this crate sees
//! them.

use serde::Deserialize;
use serde_json::Value;

/// One entry of a tree-export `parts` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    /// Plain text
    Text(String),
    /// Attachment references, image pointers and anything else
    Other(Value),
}

/// Content payload of a tree-export message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// `{"content_type": "...", "parts": [...]}`
    Parts { parts: Vec<ContentPart> },
    /// `{"content_type": "...", "text": "..."}`
    Text { text: String },
    /// Shapes without extractable text (code execution output, etc.)
    Unsupported(Value),
}

impl MessageContent {
    /// Extract text: string parts joined by a single space, then trimmed.
    pub fn into_text(self) -> String {
        match self {
            MessageContent::Parts { parts } => parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text(text) => Some(text),
                    ContentPart::Other(_) => None,
                })
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string(),
            MessageContent::Text { text } => text.trim().to_string(),
            MessageContent::Unsupported(_) => String::new(),
        }
    }
}

/// One typed block in a flat-history turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentBlock {
    /// `{"type": "text", "text": "..."}` and other typed blocks
    Typed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        text: Option<String>,
    },
    /// Untyped entries
    Other(Value),
}

/// Content of a flat-history turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    /// Flat string
    Text(String),
    /// List of typed blocks
    Blocks(Vec<ContentBlock>),
    /// Anything else
    Unsupported(Value),
}

impl TurnContent {
    /// Extract text: text-typed blocks joined by newlines, then trimmed.
    pub fn into_text(self) -> String {
        match self {
            TurnContent::Text(text) => text.trim().to_string(),
            TurnContent::Blocks(blocks) => blocks
                .into_iter()
                .filter_map(|block| match block {
                    ContentBlock::Typed { kind, text } if kind == "text" => text,
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string(),
            TurnContent::Unsupported(_) => String::new(),
        }
    }
}
