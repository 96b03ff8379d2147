//! Parser trait and platform dispatch.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info};

use wrapped_types::{Conversation, Platform, WrappedError};

use crate::chatgpt::ChatGptParser;
use crate::claude::ClaudeParser;

/// Trait for platform-specific export decoders.
///
/// A decoder turns the raw export text into canonical conversations and
/// enforces the model invariants: no empty messages, no empty
/// conversations, messages in chronological order.
pub trait ExportParser: Send + Sync {
    /// Platform this parser understands.
    fn platform(&self) -> Platform;

    /// Decode an export document.
    ///
    /// Fails with [`WrappedError::Parse`] when the payload is not JSON, is
    /// not shaped like this platform's export, or yields no usable
    /// conversations.
    fn parse(&self, raw: &str) -> Result<Vec<Conversation>, WrappedError>;
}

/// Parser for a platform.
pub fn parser_for(platform: Platform) -> Box<dyn ExportParser> {
    match platform {
        Platform::ChatGpt => Box::new(ChatGptParser::new()),
        Platform::Claude => Box::new(ClaudeParser::new()),
    }
}

/// Resolve a platform selector and decode the document.
///
/// Unknown selectors fail with [`WrappedError::Configuration`].
pub fn parse_export(raw: &str, platform: &str) -> Result<Vec<Conversation>, WrappedError> {
    let platform: Platform = platform.parse()?;
    let conversations = parser_for(platform).parse(raw)?;
    info!(
        platform = %platform,
        conversations = conversations.len(),
        "Parsed export"
    );
    Ok(conversations)
}

/// Split a document into per-conversation JSON records.
///
/// Accepts a top-level array, or an object wrapping the array under
/// `conversations`.
pub(crate) fn conversation_records(
    raw: &str,
    platform: Platform,
) -> Result<Vec<Value>, WrappedError> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| WrappedError::parse(platform, format!("not valid JSON ({e})")))?;

    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("conversations") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(WrappedError::parse(
                platform,
                "expected an array of conversations",
            )),
        },
        _ => Err(WrappedError::parse(
            platform,
            "expected an array of conversations",
        )),
    }
}

/// Pick a conversation id that is unique within the batch.
///
/// Missing ids are synthesized as `<platform>-<index>`; repeated ids get the
/// record index appended.
pub(crate) fn unique_id(
    candidate: Option<String>,
    platform: Platform,
    index: usize,
    seen: &mut HashSet<String>,
) -> String {
    let base = candidate
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("{}-{index}", platform.id_prefix()));

    let id = if seen.contains(&base) {
        format!("{base}-{index}")
    } else {
        base
    };
    seen.insert(id.clone());
    id
}

/// Reject a batch that produced nothing usable.
pub(crate) fn require_conversations(
    platform: Platform,
    record_count: usize,
    conversations: Vec<Conversation>,
) -> Result<Vec<Conversation>, WrappedError> {
    if conversations.is_empty() {
        return Err(WrappedError::parse(
            platform,
            format!("no usable conversations found in {record_count} records"),
        ));
    }
    debug!(
        platform = %platform,
        records = record_count,
        kept = conversations.len(),
        "Finished decoding"
    );
    Ok(conversations)
}
