//! End-to-end test infrastructure for ai-wrapped.
//!
//! Builds export documents in both platform layouts and runs them through
//! the full parse-to-story pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use wrapped_story::{MockGenerator, WrappedPipeline};

/// Shared harness for E2E tests.
///
/// Keeps a temp directory alive so tests can exercise the file-reading
/// path the CLI takes.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Seeded pipeline with the offline mock generator
    pub pipeline: WrappedPipeline,
}

impl TestHarness {
    /// Harness with a seeded pipeline bucketing in UTC.
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Harness with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let pipeline = WrappedPipeline::new(Arc::new(MockGenerator::new())).with_seed(seed);
        Self {
            _temp_dir: temp_dir,
            pipeline,
        }
    }

    /// Write an export document into the temp dir and return its path.
    pub fn write_export(&self, name: &str, doc: &Value) -> PathBuf {
        let path = self._temp_dir.path().join(name);
        std::fs::write(&path, doc.to_string()).expect("Failed to write export");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// UTC timestamp helper.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test timestamp")
}

/// One turn of a fixture conversation.
#[derive(Debug, Clone)]
pub struct Turn {
    pub user: bool,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user: true,
            text: text.into(),
            at,
        }
    }

    pub fn assistant(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            user: false,
            text: text.into(),
            at,
        }
    }
}

/// Tree-structured (ChatGPT) conversation record.
pub fn chatgpt_conversation(id: &str, title: &str, turns: &[Turn]) -> Value {
    let mut mapping = serde_json::Map::new();
    mapping.insert("root".to_string(), json!({ "message": null }));
    for (i, turn) in turns.iter().enumerate() {
        mapping.insert(
            format!("node-{i}"),
            json!({
                "message": {
                    "author": { "role": if turn.user { "user" } else { "assistant" } },
                    "content": { "content_type": "text", "parts": [turn.text] },
                    "create_time": turn.at.timestamp() as f64,
                }
            }),
        );
    }
    let create_time = turns
        .first()
        .map(|t| t.at.timestamp() as f64)
        .unwrap_or_default();
    json!({
        "id": id,
        "title": title,
        "create_time": create_time,
        "mapping": mapping,
    })
}

/// Flat-history (Claude) conversation record.
pub fn claude_conversation(uuid: &str, name: &str, turns: &[Turn]) -> Value {
    let messages: Vec<Value> = turns
        .iter()
        .map(|turn| {
            json!({
                "sender": if turn.user { "human" } else { "assistant" },
                "text": turn.text,
                "created_at": turn.at.to_rfc3339(),
            })
        })
        .collect();
    let created_at = turns.first().map(|t| t.at.to_rfc3339());
    json!({
        "uuid": uuid,
        "name": name,
        "created_at": created_at,
        "chat_messages": messages,
    })
}

/// Alternating user/assistant turns, one pair per entry in `days`.
///
/// Each pair is stamped at `hour` on that day (UTC).
pub fn alternating_turns(days: &[(i32, u32, u32)], hour: u32, user_text: &str) -> Vec<Turn> {
    days.iter()
        .enumerate()
        .flat_map(|(i, &(y, m, d))| {
            let minute = (i % 30) as u32;
            [
                Turn::user(format!("{user_text} {i}"), at(y, m, d, hour, minute)),
                Turn::assistant("Sure, here you go.", at(y, m, d, hour, minute + 1)),
            ]
        })
        .collect()
}
