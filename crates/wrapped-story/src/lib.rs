//! # wrapped-story
//!
//! Last stage of the ai-wrapped pipeline.
//!
//! - [`StoryComposer`]: ordered, themed story steps from an analytics result
//! - [`TextGenerator`]: async collaborator for topic and persona text, with
//!   [`ApiGenerator`] (OpenAI-compatible or Anthropic) and [`MockGenerator`]
//! - [`encode_share_token`] / [`decode_share_token`]: URL-safe snapshots
//! - [`WrappedPipeline`]: parse, aggregate, compose and encode in one call

pub mod composer;
pub mod format;
pub mod generator;
pub mod pipeline;
pub mod share;
pub mod step;

pub use composer::{sample_messages, StoryComposer};
pub use generator::{
    ApiGenerator, ApiGeneratorConfig, GenerationError, MockGenerator, TextGenerator, TopicSummary,
};
pub use pipeline::{WrappedPipeline, WrappedReport};
pub use share::{decode_share_token, encode_share_token};
pub use step::{ChartPoint, Step, StepKind, Theme};
