//! Canonical conversation model.
//!
//! Every export format is decoded into these types at the parser boundary.
//! Nothing downstream of the parsers sees platform-specific shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of the message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The person who exported the history
    User,
    /// The AI assistant
    Assistant,
    /// Platform-internal instructions
    System,
    /// Tool invocations and results (counted in totals only)
    Tool,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Assistant => write!(f, "assistant"),
            Author::System => write!(f, "system"),
            Author::Tool => write!(f, "tool"),
        }
    }
}

/// A single chat turn.
///
/// Parsers guarantee `content` is non-empty (trimmed) and `timestamp` is a
/// real post-epoch instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub author: Author,

    /// Plain-text content
    pub content: String,

    /// When the message was sent
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message.
    pub fn new(author: Author, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            author,
            content: content.into(),
            timestamp,
        }
    }

    /// True if the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    /// True if the timestamp can be placed on a calendar.
    ///
    /// Epoch-zero (and earlier) instants come from incomplete export
    /// records and never count as activity.
    pub fn has_valid_timestamp(&self) -> bool {
        self.timestamp.timestamp_millis() > 0
    }

    /// Content length in characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A conversation thread in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Identifier, unique within one parsed batch
    pub id: String,

    /// Display title
    pub title: String,

    /// Creation time in seconds since the Unix epoch
    pub created_at: i64,

    /// Messages in chronological order
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Title used when the export carries none.
    pub const UNTITLED: &'static str = "Untitled Conversation";

    /// Create a conversation, sorting messages chronologically.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        created_at: i64,
        mut messages: Vec<Message>,
    ) -> Self {
        messages.sort_by_key(|m| m.timestamp);
        Self {
            id: id.into(),
            title: title.into(),
            created_at,
            messages,
        }
    }

    /// Number of messages in the conversation.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no messages survived parsing.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
