//! Aggregated analytics contract.
//!
//! [`AnalyticsResult`] is built once by the aggregator and only read
//! afterwards. Its serialized form (camelCase, without raw user messages) is
//! also the share-token payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::platform::Platform;

/// Message count for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: String,
    pub count: usize,
}

/// Message count for one hour of the day (label `"H:00"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    pub hour: String,
    pub count: usize,
}

impl HourCount {
    /// Hour of day parsed back from the label.
    pub fn hour_of_day(&self) -> Option<u32> {
        self.hour.split(':').next()?.parse().ok()
    }
}

/// Message count for one calendar month (label `"Jan 2024"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

/// Frequency of one word across user messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub text: String,
    pub value: usize,
}

/// Behavioral archetype assigned to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl Persona {
    /// Create a new persona.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
        }
    }

    /// Stand-in used while the rest of the result is assembled.
    pub fn placeholder() -> Self {
        Self::new("", "", "")
    }
}

/// Statistical summary of one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub platform: Platform,
    pub total_conversations: usize,
    pub total_messages: usize,
    pub user_message_count: usize,
    pub assistant_message_count: usize,

    /// Earliest retained message timestamp
    pub first_chat_date: DateTime<Utc>,

    /// Latest retained message timestamp
    pub last_chat_date: DateTime<Utc>,

    /// Rounded to one decimal place
    pub avg_messages_per_convo: f64,

    pub busiest_day: DayCount,
    pub busiest_hour: HourCount,

    /// Always 7 entries, Sunday first
    #[serde(default)]
    pub daily_activity: Vec<DayCount>,

    /// Always 24 entries, hour 0 first
    #[serde(default)]
    pub hourly_activity: Vec<HourCount>,

    /// Chronological, active months only
    #[serde(default)]
    pub monthly_activity: Vec<MonthCount>,

    /// Top 50 words, descending by count
    #[serde(default)]
    pub word_frequency: Vec<WordCount>,

    /// Distinct non-stop-word tokens across user messages
    #[serde(default)]
    pub vocabulary_size: usize,

    /// Distinct calendar days with at least one message
    #[serde(default)]
    pub active_days: usize,

    pub longest_streak: usize,

    pub user_persona: Persona,

    /// Raw user messages for later stages. Never serialized.
    #[serde(skip)]
    pub user_messages: Vec<Message>,
}

impl AnalyticsResult {
    /// Mean user message length in characters (0 when the user sent nothing).
    pub fn average_user_message_length(&self) -> f64 {
        if self.user_messages.is_empty() {
            return 0.0;
        }
        let total: usize = self.user_messages.iter().map(Message::char_len).sum();
        total as f64 / self.user_messages.len() as f64
    }

    /// Number of user messages containing a question mark.
    pub fn user_question_count(&self) -> usize {
        self.user_messages
            .iter()
            .filter(|m| m.content.contains('?'))
            .count()
    }

    /// Messages sent during the given hours of day (inclusive bounds, may wrap midnight).
    pub fn messages_in_hours(&self, start: u32, end: u32) -> usize {
        self.hourly_activity
            .iter()
            .filter(|h| {
                h.hour_of_day().is_some_and(|hour| {
                    if start <= end {
                        (start..=end).contains(&hour)
                    } else {
                        hour >= start || hour <= end
                    }
                })
            })
            .map(|h| h.count)
            .sum()
    }

    /// The `n` most frequent words.
    pub fn top_words(&self, n: usize) -> Vec<String> {
        self.word_frequency
            .iter()
            .take(n)
            .map(|w| w.text.clone())
            .collect()
    }
}
