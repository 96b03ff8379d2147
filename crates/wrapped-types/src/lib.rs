//! # wrapped-types
//!
//! Shared domain types for ai-wrapped.
//!
//! This crate defines the data contracts every other crate operates on:
//! - Canonical model: [`Conversation`] and [`Message`], independent of the
//!   export format they were decoded from
//! - [`AnalyticsResult`]: the immutable aggregate produced once per run
//! - [`WrappedError`]: the error taxonomy surfaced to callers
//! - [`Settings`]: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use wrapped_types::{Author, Message};
//! use chrono::Utc;
//!
//! let msg = Message::new(Author::User, "hello there", Utc::now());
//! assert!(msg.is_user());
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod message;
pub mod platform;

pub use analytics::{AnalyticsResult, DayCount, HourCount, MonthCount, Persona, WordCount};
pub use config::{GeneratorSettings, Settings};
pub use error::{ErrorCategory, WrappedError};
pub use message::{Author, Conversation, Message};
pub use platform::Platform;
