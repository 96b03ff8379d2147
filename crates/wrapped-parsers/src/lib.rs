//! # wrapped-parsers
//!
//! Format-tolerant decoders for exported AI-chat histories.
//!
//! ## Core Components
//!
//! - [`ExportParser`]: Trait every platform decoder implements
//! - [`ChatGptParser`]: Tree-structured `conversations.json` exports
//! - [`ClaudeParser`]: Flat-history exports
//! - [`parse_export`]: Resolve a platform selector and decode in one call
//!
//! ## Usage
//!
//! ```rust
//! use wrapped_parsers::parse_export;
//!
//! let raw = r#"[{"uuid": "c1", "name": "Hi", "created_at": "2024-03-05T10:00:00Z",
//!               "chat_messages": [{"sender": "human", "text": "hello"}]}]"#;
//! let conversations = parse_export(raw, "Claude").unwrap();
//! assert_eq!(conversations[0].messages.len(), 1);
//! ```

pub mod chatgpt;
pub mod claude;
pub mod content;
pub mod parser;
pub mod timestamp;

pub use chatgpt::ChatGptParser;
pub use claude::ClaudeParser;
pub use parser::{parse_export, parser_for, ExportParser};
