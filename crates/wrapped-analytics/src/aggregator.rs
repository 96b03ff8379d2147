//! Single-pass aggregation of canonical conversations.
//!
//! Buckets are always enumerated in canonical order (Sunday..Saturday,
//! 0..23) so ties for the busiest day/hour resolve to the earliest bucket.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use tracing::{debug, info};

use wrapped_types::{
    AnalyticsResult, Author, Conversation, DayCount, HourCount, Message, MonthCount, Persona,
    Platform, WrappedError,
};

use crate::bucketing::Bucketing;
use crate::persona::PersonaClassifier;
use crate::streak::longest_streak;
use crate::words::{word_frequency, TOP_WORD_LIMIT};

/// Weekday labels, Sunday first.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Label used for busiest day/hour when nothing could be bucketed.
const NOT_AVAILABLE: &str = "N/A";

/// Counters filled during the pass over all messages.
struct TemporalBuckets {
    daily: [usize; 7],
    hourly: [usize; 24],
    monthly: BTreeMap<(i32, u32), (String, usize)>,
    days: BTreeSet<NaiveDate>,
}

impl TemporalBuckets {
    fn new() -> Self {
        Self {
            daily: [0; 7],
            hourly: [0; 24],
            monthly: BTreeMap::new(),
            days: BTreeSet::new(),
        }
    }

    fn record(&mut self, local: NaiveDateTime) {
        self.daily[local.weekday().num_days_from_sunday() as usize] += 1;
        self.hourly[local.hour() as usize] += 1;
        self.monthly
            .entry((local.year(), local.month()))
            .or_insert_with(|| (local.format("%b %Y").to_string(), 0))
            .1 += 1;
        self.days.insert(local.date());
    }

    fn busiest_day(&self) -> DayCount {
        match busiest(&self.daily) {
            Some((i, count)) => DayCount {
                day: WEEKDAYS[i].to_string(),
                count,
            },
            None => DayCount {
                day: NOT_AVAILABLE.to_string(),
                count: 0,
            },
        }
    }

    fn busiest_hour(&self) -> HourCount {
        match busiest(&self.hourly) {
            Some((hour, count)) => HourCount {
                hour: hour_label(hour),
                count,
            },
            None => HourCount {
                hour: NOT_AVAILABLE.to_string(),
                count: 0,
            },
        }
    }
}

/// First bucket holding the maximum (non-zero) count.
fn busiest(counts: &[usize]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for (i, &count) in counts.iter().enumerate() {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((i, count));
        }
    }
    best
}

fn hour_label(hour: usize) -> String {
    format!("{hour}:00")
}

/// Round to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds [`AnalyticsResult`] values from parsed conversations.
#[derive(Debug, Clone)]
pub struct Aggregator {
    platform: Platform,
    bucketing: Bucketing,
    classifier: PersonaClassifier,
}

impl Aggregator {
    /// Aggregator bucketing in UTC.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            bucketing: Bucketing::utc(),
            classifier: PersonaClassifier::new(),
        }
    }

    /// Zone used for day, hour and month buckets.
    pub fn with_bucketing(mut self, bucketing: Bucketing) -> Self {
        self.bucketing = bucketing;
        self
    }

    /// Aggregate conversations, drawing persona fallback randomness from the
    /// thread-local generator.
    pub fn aggregate(&self, conversations: &[Conversation]) -> Result<AnalyticsResult, WrappedError> {
        self.aggregate_with_rng(conversations, &mut rand::rng())
    }

    /// Aggregate conversations with an explicit random source.
    ///
    /// Fails with [`WrappedError::EmptyDataset`] when no messages remain.
    pub fn aggregate_with_rng<R: Rng + ?Sized>(
        &self,
        conversations: &[Conversation],
        rng: &mut R,
    ) -> Result<AnalyticsResult, WrappedError> {
        let mut result = self.summarize(conversations)?;
        result.user_persona = self.classifier.classify_with_rng(&result, rng);
        info!(
            platform = %self.platform,
            conversations = result.total_conversations,
            messages = result.total_messages,
            persona = %result.user_persona.title,
            "Aggregated analytics"
        );
        Ok(result)
    }

    /// Every field except the persona, which is derived from the rest.
    fn summarize(&self, conversations: &[Conversation]) -> Result<AnalyticsResult, WrappedError> {
        let conversations: Vec<&Conversation> =
            conversations.iter().filter(|c| !c.is_empty()).collect();
        let all_messages: Vec<&Message> =
            conversations.iter().flat_map(|c| c.messages.iter()).collect();

        let (first_chat_date, last_chat_date) = match (
            all_messages.iter().map(|m| m.timestamp).min(),
            all_messages.iter().map(|m| m.timestamp).max(),
        ) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(WrappedError::EmptyDataset),
        };

        let user_messages: Vec<Message> = all_messages
            .iter()
            .filter(|m| m.author == Author::User)
            .map(|m| (*m).clone())
            .collect();
        let assistant_message_count = all_messages
            .iter()
            .filter(|m| m.author == Author::Assistant)
            .count();

        let mut buckets = TemporalBuckets::new();
        let mut skipped = 0usize;
        for message in &all_messages {
            if message.has_valid_timestamp() {
                buckets.record(self.bucketing.localize(message.timestamp));
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!(skipped, "Messages without a usable timestamp left out of histograms");
        }

        let words = word_frequency(&user_messages, TOP_WORD_LIMIT);

        let avg_messages_per_convo = if conversations.is_empty() {
            0.0
        } else {
            round_one_decimal(all_messages.len() as f64 / conversations.len() as f64)
        };

        Ok(AnalyticsResult {
            platform: self.platform,
            total_conversations: conversations.len(),
            total_messages: all_messages.len(),
            user_message_count: user_messages.len(),
            assistant_message_count,
            first_chat_date,
            last_chat_date,
            avg_messages_per_convo,
            busiest_day: buckets.busiest_day(),
            busiest_hour: buckets.busiest_hour(),
            daily_activity: WEEKDAYS
                .iter()
                .zip(buckets.daily)
                .map(|(day, count)| DayCount {
                    day: day.to_string(),
                    count,
                })
                .collect(),
            hourly_activity: buckets
                .hourly
                .iter()
                .enumerate()
                .map(|(hour, &count)| HourCount {
                    hour: hour_label(hour),
                    count,
                })
                .collect(),
            monthly_activity: buckets
                .monthly
                .values()
                .map(|(month, count)| MonthCount {
                    month: month.clone(),
                    count: *count,
                })
                .collect(),
            word_frequency: words.top,
            vocabulary_size: words.vocabulary_size,
            active_days: buckets.days.len(),
            longest_streak: longest_streak(&buckets.days),
            user_persona: Persona::placeholder(),
            user_messages,
        })
    }
}
