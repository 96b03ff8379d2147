//! # wrapped-analytics
//!
//! Turns canonical conversations into an [`AnalyticsResult`] and derives
//! the persona and trivia stages from it.
//!
//! - [`Bucketing`]: fixed-offset or per-instant local wall-clock time
//! - [`Aggregator`]: single pass over all messages producing histograms,
//!   counts, word frequency and streaks
//! - [`PersonaClassifier`]: ordered detector table with a rarity-weighted
//!   random fallback
//! - [`generate_trivia`]: one multiple-choice question from the analytics
//!
//! Stages that involve randomness expose `*_with_rng` variants so callers
//! can seed them.
//!
//! [`AnalyticsResult`]: wrapped_types::AnalyticsResult

pub mod aggregator;
pub mod bucketing;
pub mod persona;
pub mod stopwords;
pub mod streak;
pub mod trivia;
pub mod words;

pub use aggregator::Aggregator;
pub use bucketing::Bucketing;
pub use persona::{
    all_personas, persona_by_title, PersonaClassifier, PersonaDefinition, PERSONA_CATALOG,
    SILENT_OBSERVER,
};
pub use streak::longest_streak;
pub use trivia::{generate_trivia, generate_trivia_with_rng, TriviaQuestion, TriviaStrategy};
pub use words::{word_frequency, WordStats, TOP_WORD_LIMIT};
