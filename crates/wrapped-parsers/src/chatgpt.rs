//! Decoder for tree-structured exports (`conversations.json`).
//!
//! Each conversation holds a `mapping` of node-id to node; a node may carry
//! a message. Branches (regenerated answers) are all kept and ordered by
//! timestamp.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use wrapped_types::{Author, Conversation, Message, Platform, WrappedError};

use crate::content::MessageContent;
use crate::parser::{conversation_records, require_conversations, unique_id, ExportParser};
use crate::timestamp::from_epoch_seconds;

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    create_time: Option<f64>,
    mapping: BTreeMap<String, RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    content: Option<MessageContent>,
    #[serde(default)]
    create_time: Option<f64>,
    #[serde(default)]
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default)]
    role: Option<String>,
}

impl RawMessage {
    fn is_hidden(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("is_visually_hidden_from_conversation"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Parser for ChatGPT data exports.
#[derive(Debug, Default, Clone)]
pub struct ChatGptParser;

impl ChatGptParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    fn decode_conversation(
        &self,
        index: usize,
        raw: RawConversation,
        seen: &mut HashSet<String>,
    ) -> Option<Conversation> {
        let conversation_ts = raw.create_time.filter(|t| *t > 0.0);

        let messages: Vec<Message> = raw
            .mapping
            .into_values()
            .filter_map(|node| decode_message(node.message?, conversation_ts))
            .collect();

        if messages.is_empty() {
            debug!(index, "Dropping conversation without usable messages");
            return None;
        }

        let created_at = conversation_ts
            .map(|t| t as i64)
            .or_else(|| messages.iter().map(|m| m.timestamp.timestamp()).min())
            .unwrap_or_default();

        let id = unique_id(raw.id.or(raw.conversation_id), Platform::ChatGpt, index, seen);
        let title = raw
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| Conversation::UNTITLED.to_string());

        Some(Conversation::new(id, title, created_at, messages))
    }
}

/// Decode one node message, or `None` if it must be skipped.
fn decode_message(message: RawMessage, conversation_ts: Option<f64>) -> Option<Message> {
    let author = match message.author.as_ref()?.role.as_deref()? {
        "user" => Author::User,
        "assistant" => Author::Assistant,
        "system" => return None,
        _ => Author::Tool,
    };

    if message.is_hidden() {
        return None;
    }

    let secs = message
        .create_time
        .filter(|t| *t > 0.0)
        .or(conversation_ts)
        .unwrap_or(0.0);
    let timestamp = resolve_timestamp(secs)?;

    let content = message.content?.into_text();
    if content.is_empty() {
        return None;
    }

    Some(Message::new(author, content, timestamp))
}

/// Zero or 1970 timestamps are artifacts of incomplete records.
fn resolve_timestamp(secs: f64) -> Option<DateTime<Utc>> {
    from_epoch_seconds(secs).filter(|ts| ts.year() > 1970)
}

impl ExportParser for ChatGptParser {
    fn platform(&self) -> Platform {
        Platform::ChatGpt
    }

    fn parse(&self, raw: &str) -> Result<Vec<Conversation>, WrappedError> {
        let records = conversation_records(raw, Platform::ChatGpt)?;
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
            if let Some(convo) = self.decode_conversation(index, convo, &mut seen) {
                conversations.push(convo);
            }
        }

        require_conversations(Platform::ChatGpt, record_count, conversations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(role: &str, parts: Value, create_time: Value) -> Value {
        json!({
            "message": {
                "author": {"role": role},
                "content": {"content_type": "text", "parts": parts},
                "create_time": create_time,
            }
        })
    }

    fn parse(doc: Value) -> Result<Vec<Conversation>, WrappedError> {
        ChatGptParser::new().parse(&doc.to_string())
    }

    #[test]
    fn test_skips_system_hidden_and_empty() {
        let doc = json!([{
            "id": "c1",
            "title": "Trip planning",
            "create_time": 1_709_632_800.0,
            "mapping": {
                "root": {"message": null},
                "a": node("system", json!(["You are helpful"]), json!(1_709_632_801.0)),
                "b": node("user", json!(["Plan a trip to Lisbon"]), json!(1_709_632_900.0)),
                "c": {
                    "message": {
                        "author": {"role": "user"},
                        "content": {"content_type": "text", "parts": ["hidden context"]},
                        "create_time": 1_709_632_850.0,
                        "metadata": {"is_visually_hidden_from_conversation": true}
                    }
                },
                "d": node("assistant", json!(["   "]), json!(1_709_632_950.0)),
                "e": node("assistant", json!(["Here is a plan"]), json!(1_709_633_000.0)),
            }
        }]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos.len(), 1);
        let contents: Vec<&str> = convos[0].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Plan a trip to Lisbon", "Here is a plan"]);
    }

    #[test]
    fn test_messages_sorted_chronologically() {
        let doc = json!([{
            "id": "c1",
            "create_time": 1_709_632_800.0,
            "mapping": {
                "a": node("assistant", json!(["later"]), json!(1_709_640_000.0)),
                "b": node("user", json!(["earlier"]), json!(1_709_635_000.0)),
            }
        }]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos[0].messages[0].content, "earlier");
        assert_eq!(convos[0].messages[1].content, "later");
    }

    #[test]
    fn test_timestamp_falls_back_to_conversation() {
        let doc = json!([{
            "id": "c1",
            "create_time": 1_709_632_800.0,
            "mapping": {"a": node("user", json!(["hello"]), Value::Null)}
        }]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos[0].messages[0].timestamp.timestamp(), 1_709_632_800);
        assert_eq!(convos[0].created_at, 1_709_632_800);
    }

    #[test]
    fn test_epoch_zero_messages_dropped() {
        let doc = json!([
            {
                "id": "no-times",
                "mapping": {"a": node("user", json!(["orphan"]), Value::Null)}
            },
            {
                "id": "ok",
                "mapping": {"a": node("user", json!(["kept"]), json!(1_709_632_800.0))}
            }
        ]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos.len(), 1);
        assert_eq!(convos[0].id, "ok");
        assert_eq!(convos[0].created_at, 1_709_632_800);
    }

    #[test]
    fn test_defaults_for_missing_id_and_title() {
        let doc = json!([{
            "mapping": {"a": node("user", json!(["hi"]), json!(1_709_632_800.0))}
        }]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos[0].id, "chatgpt-0");
        assert_eq!(convos[0].title, "Untitled Conversation");
    }

    #[test]
    fn test_tool_role_kept_as_tool() {
        let doc = json!([{
            "id": "c1",
            "mapping": {"a": node("tool", json!(["search results"]), json!(1_709_632_800.0))}
        }]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos[0].messages[0].author, Author::Tool);
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let doc = json!([
            {"id": "broken", "mapping": "not a map"},
            {"id": "ok", "mapping": {"a": node("user", json!(["kept"]), json!(1_709_632_800.0))}}
        ]);

        let convos = parse(doc).unwrap();
        assert_eq!(convos.len(), 1);
        assert_eq!(convos[0].id, "ok");
    }

    #[test]
    fn test_flat_export_of_other_platform_fails() {
        let doc = json!([{"uuid": "x", "chat_messages": [{"sender": "human", "text": "hi"}]}]);
        let err = parse(doc).unwrap_err();
        assert!(matches!(err, WrappedError::Parse { .. }));
    }
}
