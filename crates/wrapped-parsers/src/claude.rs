//! Decoder for flat-history exports.
//!
//! Accepts the official export keys (`uuid`, `name`, `created_at`,
//! `chat_messages`, `sender`) and the older `id`/`title`/`create_time`/
//! `history`/`role` layout.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use wrapped_types::{Author, Conversation, Message, Platform, WrappedError};

use crate::content::TurnContent;
use crate::parser::{conversation_records, require_conversations, unique_id, ExportParser};
use crate::timestamp::RawTimestamp;

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default, alias = "id")]
    uuid: Option<String>,
    #[serde(default, alias = "title")]
    name: Option<String>,
    #[serde(default, alias = "create_time")]
    created_at: Option<RawTimestamp>,
    #[serde(alias = "history")]
    chat_messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTurn {
    #[serde(default, alias = "role")]
    sender: Option<String>,
    #[serde(default)]
    content: Option<TurnContent>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "create_time")]
    created_at: Option<RawTimestamp>,
}

impl RawTurn {
    fn author(&self) -> Author {
        match self.sender.as_deref() {
            Some("human") | Some("user") => Author::User,
            _ => Author::Assistant,
        }
    }

    /// Text-typed content blocks, falling back to the flat `text` field.
    fn into_text(self) -> String {
        let from_content = self.content.map(TurnContent::into_text).unwrap_or_default();
        if !from_content.is_empty() {
            return from_content;
        }
        self.text.map(|t| t.trim().to_string()).unwrap_or_default()
    }
}

/// Parser for Claude data exports.
#[derive(Debug, Default, Clone)]
pub struct ClaudeParser;

impl ClaudeParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Decode with an explicit "now" used when no timestamp is available.
    pub fn parse_at(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Conversation>, WrappedError> {
        let records = conversation_records(raw, Platform::Claude)?;
        let record_count = records.len();

        let mut seen = HashSet::new();
        let mut conversations = Vec::with_capacity(record_count);

        for (index, record) in records.into_iter().enumerate() {
            let convo: RawConversation = match serde_json::from_value(record) {
                Ok(convo) => convo,
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed conversation record");
                    continue;
                }
            };
            if let Some(convo) = decode_conversation(index, convo, now, &mut seen) {
                conversations.push(convo);
            }
        }

        require_conversations(Platform::Claude, record_count, conversations)
    }
}

fn decode_conversation(
    index: usize,
    raw: RawConversation,
    now: DateTime<Utc>,
    seen: &mut HashSet<String>,
) -> Option<Conversation> {
    // Per-turn timestamp, then conversation creation time, then now.
    let conversation_ts = raw
        .created_at
        .as_ref()
        .and_then(RawTimestamp::resolve)
        .unwrap_or(now);

    let messages: Vec<Message> = raw
        .chat_messages
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawTurn>(value) {
            Ok(turn) => Some(turn),
            Err(e) => {
                debug!(index, error = %e, "Skipping malformed chat turn");
                None
            }
        })
        .filter_map(|turn| {
            let timestamp = turn
                .created_at
                .as_ref()
                .and_then(RawTimestamp::resolve)
                .unwrap_or(conversation_ts);
            let author = turn.author();
            let content = turn.into_text();
            (!content.is_empty()).then(|| Message::new(author, content, timestamp))
        })
        .collect();

    if messages.is_empty() {
        debug!(index, "Dropping conversation without usable messages");
        return None;
    }

    let id = unique_id(raw.uuid, Platform::Claude, index, seen);
    let title = raw
        .name
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| Conversation::UNTITLED.to_string());

    Some(Conversation::new(
        id,
        title,
        conversation_ts.timestamp(),
        messages,
    ))
}

impl ExportParser for ClaudeParser {
    fn platform(&self) -> Platform {
        Platform::Claude
    }

    fn parse(&self, raw: &str) -> Result<Vec<Conversation>, WrappedError> {
        self.parse_at(raw, Utc::now())
    }
}
