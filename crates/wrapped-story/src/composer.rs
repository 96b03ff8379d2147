//! Story composition.
//!
//! Turns an [`AnalyticsResult`] into an ordered list of [`Step`]s. The two
//! generated texts are requested concurrently, each under a timeout; any
//! failure is replaced by static text so composition always completes.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::time::timeout;
use tracing::{debug, warn};

use wrapped_analytics::{generate_trivia_with_rng, Bucketing};
use wrapped_types::{AnalyticsResult, Message, Persona};

use crate::format::{format_count, format_date, format_decimal, format_hour};
use crate::generator::{fallback_persona_description, TextGenerator, TopicSummary};
use crate::step::{ChartPoint, Step, StepKind, Theme};

/// Default number of user messages sent for topic summarization.
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// Default per-call generation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Streaks longer than this get their own step.
const STREAK_STEP_THRESHOLD: usize = 5;

/// Averages above this get the "deep dives" step.
const DEEP_DIVE_THRESHOLD: f64 = 15.0;

/// Number of top words handed to the persona description.
const PERSONA_WORDS: usize = 10;

/// Up to `size` user messages in random order.
pub fn sample_messages<R: Rng + ?Sized>(messages: &[Message], size: usize, rng: &mut R) -> Vec<Message> {
    let mut sample = messages.to_vec();
    sample.shuffle(rng);
    sample.truncate(size);
    sample
}

/// Builds story steps, enriching two of them with generated text.
#[derive(Clone)]
pub struct StoryComposer {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    sample_size: usize,
    bucketing: Bucketing,
}

impl StoryComposer {
    /// Create a composer around a text generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: DEFAULT_TIMEOUT,
            sample_size: DEFAULT_SAMPLE_SIZE,
            bucketing: Bucketing::utc(),
        }
    }

    /// Set the per-call generation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the topic sample size.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Zone used for dates in story text; match the aggregator's.
    pub fn with_bucketing(mut self, bucketing: Bucketing) -> Self {
        self.bucketing = bucketing;
        self
    }

    /// Compose with fresh randomness.
    pub async fn compose(&self, analytics: &AnalyticsResult) -> Vec<Step> {
        let mut rng = StdRng::from_os_rng();
        self.compose_with_rng(analytics, &mut rng).await
    }

    /// Compose with an explicit random source for sampling and trivia.
    pub async fn compose_with_rng<R: Rng + Send + ?Sized>(
        &self,
        analytics: &AnalyticsResult,
        rng: &mut R,
    ) -> Vec<Step> {
        let sample = sample_messages(&analytics.user_messages, self.sample_size, rng);
        let trivia = generate_trivia_with_rng(analytics, rng);
        let top_words = analytics.top_words(PERSONA_WORDS);

        let (topic, persona_text) = tokio::join!(
            self.topic_summary(&sample),
            self.persona_description(&analytics.user_persona, &top_words),
        );

        let mut builder = StepBuilder::default();

        builder.stat(
            "Your Year in Review",
            analytics.platform.to_string(),
            format!(
                "You had {} conversations from {} to {}.",
                format_count(analytics.total_conversations),
                format_date(analytics.first_chat_date, &self.bucketing),
                format_date(analytics.last_chat_date, &self.bucketing)
            ),
            "users",
        );

        builder.stat(
            "Message Volume",
            format_count(analytics.total_messages),
            format!(
                "messages exchanged. You sent {} and the AI sent {}.",
                format_count(analytics.user_message_count),
                format_count(analytics.assistant_message_count)
            ),
            "message-square",
        );

        if analytics.longest_streak > STREAK_STEP_THRESHOLD {
            builder.stat(
                "Longest Streak",
                format!("{} days", analytics.longest_streak),
                "Was your longest stretch of consecutive daily chats. Talk about commitment!",
                "zap",
            );
        }

        if analytics.avg_messages_per_convo > DEEP_DIVE_THRESHOLD {
            builder.stat(
                "Deep Dives",
                format!("{} messages", format_decimal(analytics.avg_messages_per_convo)),
                "Was your average per conversation. You love to explore topics thoroughly!",
                "repeat",
            );
        }

        builder.stat("Your Top Topic", topic.title, topic.insight, "lightbulb");

        builder.chart(
            "Busiest Day of the Week",
            analytics.daily_activity.iter().map(ChartPoint::from).collect(),
            format!(
                "Looks like {} was your go-to day for chatting.",
                analytics.busiest_day.day
            ),
            "calendar",
        );

        let busiest_hour = analytics
            .busiest_hour
            .hour_of_day()
            .map(format_hour)
            .unwrap_or_else(|| "an unknown time".to_string());
        builder.chart(
            "Most Active Hour",
            analytics.hourly_activity.iter().map(ChartPoint::from).collect(),
            format!("You were most active around {busiest_hour}. A true night owl or an early bird?"),
            "clock",
        );

        if analytics.monthly_activity.len() > 1 {
            builder.chart(
                "Monthly Activity",
                analytics.monthly_activity.iter().map(ChartPoint::from).collect(),
                "Here's a look at your chat activity throughout the year.",
                "bar-chart",
            );
        }

        builder.push(StepKind::Trivia, |theme| Step::Trivia {
            title: "Pop Quiz!".to_string(),
            question: trivia,
            theme,
        });

        let persona = &analytics.user_persona;
        builder.push(StepKind::Persona, |theme| Step::Persona {
            title: "Your AI Personality Is...".to_string(),
            persona_title: format!("{} {} {}", persona.icon, persona.title, persona.icon),
            description: persona_text,
            icon: persona.icon.clone(),
            theme,
        });

        debug!(steps = builder.steps.len(), "Composed story");
        builder.steps
    }

    async fn topic_summary(&self, sample: &[Message]) -> TopicSummary {
        match timeout(self.timeout, self.generator.summarize_topic(sample)).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => {
                warn!(error = %e, "Topic summary failed, using fallback");
                TopicSummary::fallback()
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Topic summary timed out, using fallback");
                TopicSummary::fallback()
            }
        }
    }

    async fn persona_description(&self, persona: &Persona, top_words: &[String]) -> String {
        match timeout(self.timeout, self.generator.describe_persona(persona, top_words)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Persona description failed, using fallback");
                fallback_persona_description(persona)
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "Persona description timed out, using fallback"
                );
                fallback_persona_description(persona)
            }
        }
    }
}

/// Accumulates steps and assigns themes by position.
#[derive(Default)]
struct StepBuilder {
    steps: Vec<Step>,
}

impl StepBuilder {
    fn push(&mut self, kind: StepKind, build: impl FnOnce(Theme) -> Step) {
        let theme = Theme::for_step(self.steps.len(), kind);
        self.steps.push(build(theme));
    }

    fn stat(
        &mut self,
        title: &str,
        value: impl Into<String>,
        description: impl Into<String>,
        icon: &str,
    ) {
        self.push(StepKind::Stat, |theme| Step::Stat {
            title: title.to_string(),
            value: value.into(),
            description: description.into(),
            icon: icon.to_string(),
            theme,
        });
    }

    fn chart(
        &mut self,
        title: &str,
        data: Vec<ChartPoint>,
        description: impl Into<String>,
        icon: &str,
    ) {
        self.push(StepKind::Chart, |theme| Step::Chart {
            title: title.to_string(),
            data,
            description: description.into(),
            icon: icon.to_string(),
            theme,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use wrapped_types::{Author, DayCount, HourCount, MonthCount, Platform, WordCount};

    use crate::generator::{GenerationError, MockGenerator};

    /// Never answers.
    struct StalledGenerator;

    #[async_trait]
    impl TextGenerator for StalledGenerator {
        async fn summarize_topic(&self, _: &[Message]) -> Result<TopicSummary, GenerationError> {
            std::future::pending().await
        }

        async fn describe_persona(&self, _: &Persona, _: &[String]) -> Result<String, GenerationError> {
            std::future::pending().await
        }
    }

    fn analytics(streak: usize, avg: f64, months: usize) -> AnalyticsResult {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 13, 0, 0).unwrap();
        AnalyticsResult {
            platform: Platform::ChatGpt,
            total_conversations: 3,
            total_messages: 1234,
            user_message_count: 600,
            assistant_message_count: 634,
            first_chat_date: ts,
            last_chat_date: ts,
            avg_messages_per_convo: avg,
            busiest_day: DayCount { day: "Tuesday".into(), count: 1234 },
            busiest_hour: HourCount { hour: "13:00".into(), count: 1234 },
            daily_activity: vec![DayCount { day: "Tuesday".into(), count: 1234 }],
            hourly_activity: vec![HourCount { hour: "13:00".into(), count: 1234 }],
            monthly_activity: (0..months)
                .map(|i| MonthCount { month: format!("M{i}"), count: 1 })
                .collect(),
            word_frequency: vec![
                WordCount { text: "rust".into(), value: 9 },
                WordCount { text: "tokio".into(), value: 5 },
            ],
            vocabulary_size: 2,
            active_days: 1,
            longest_streak: streak,
            user_persona: Persona::new("The Debugger", "Finds bugs.", "🐛"),
            user_messages: vec![Message::new(Author::User, "rust tokio rust", ts)],
        }
    }

    fn titles(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(Step::title).collect()
    }

    #[tokio::test]
    async fn test_minimal_story_order() {
        let composer = StoryComposer::new(Arc::new(MockGenerator::new()));
        let steps = composer
            .compose_with_rng(&analytics(5, 15.0, 1), &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(
            titles(&steps),
            vec![
                "Your Year in Review",
                "Message Volume",
                "Your Top Topic",
                "Busiest Day of the Week",
                "Most Active Hour",
                "Pop Quiz!",
                "Your AI Personality Is...",
            ]
        );
    }

    #[tokio::test]
    async fn test_conditional_steps_included() {
        let composer = StoryComposer::new(Arc::new(MockGenerator::new()));
        let steps = composer
            .compose_with_rng(&analytics(6, 15.5, 2), &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(
            titles(&steps),
            vec![
                "Your Year in Review",
                "Message Volume",
                "Longest Streak",
                "Deep Dives",
                "Your Top Topic",
                "Busiest Day of the Week",
                "Most Active Hour",
                "Monthly Activity",
                "Pop Quiz!",
                "Your AI Personality Is...",
            ]
        );
        match &steps[3] {
            Step::Stat { value, .. } => assert_eq!(value, "15.5 messages"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stat_texts() {
        let composer = StoryComposer::new(Arc::new(MockGenerator::new()));
        let steps = composer
            .compose_with_rng(&analytics(1, 2.0, 1), &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(
            steps[0].description(),
            Some("You had 3 conversations from March 5, 2024 to March 5, 2024.")
        );
        match &steps[1] {
            Step::Stat { value, description, .. } => {
                assert_eq!(value, "1,234");
                assert_eq!(description, "messages exchanged. You sent 600 and the AI sent 634.");
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert!(steps[4]
            .description()
            .is_some_and(|d| d.contains("around 1 PM")));
        match steps.last() {
            Some(Step::Persona { persona_title, .. }) => {
                assert_eq!(persona_title, "🐛 The Debugger 🐛")
            }
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_intro_dates_use_bucketing_zone() {
        // 13:00 UTC on March 5 is 23:00 on March 4 at UTC-14.
        let zone = Bucketing::Fixed(chrono::FixedOffset::west_opt(14 * 3600).unwrap());
        let composer = StoryComposer::new(Arc::new(MockGenerator::new())).with_bucketing(zone);
        let steps = composer
            .compose_with_rng(&analytics(1, 2.0, 1), &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(
            steps[0].description(),
            Some("You had 3 conversations from March 4, 2024 to March 4, 2024.")
        );
    }

    #[tokio::test]
    async fn test_failing_generator_uses_fallbacks() {
        let composer = StoryComposer::new(Arc::new(MockGenerator::failing()));
        let steps = composer
            .compose_with_rng(&analytics(1, 2.0, 1), &mut StdRng::seed_from_u64(1))
            .await;

        match &steps[2] {
            Step::Stat { value, description, .. } => {
                assert_eq!(value, "Deep Thinker");
                assert_eq!(
                    description,
                    "You explored a wide variety of fascinating subjects in your conversations!"
                );
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert_eq!(
            steps.last().and_then(Step::description),
            Some("You're The Debugger! Finds bugs. Your conversations are truly one-of-a-kind, shaping the digital cosmos with every word.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_generator_times_out_to_fallback() {
        let composer = StoryComposer::new(Arc::new(StalledGenerator))
            .with_timeout(Duration::from_secs(3));
        let steps = composer
            .compose_with_rng(&analytics(1, 2.0, 1), &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(steps[2].description(), Some(TopicSummary::fallback().insight.as_str()));
        assert!(steps
            .last()
            .and_then(Step::description)
            .is_some_and(|d| d.starts_with("You're The Debugger!")));
    }

    #[tokio::test]
    async fn test_every_step_has_theme() {
        let composer = StoryComposer::new(Arc::new(MockGenerator::new()));
        let steps = composer
            .compose_with_rng(&analytics(9, 30.0, 3), &mut StdRng::seed_from_u64(2))
            .await;
        assert!(steps.iter().all(|s| !s.theme().primary_color.is_empty()));
        assert_eq!(steps.last().map(Step::kind), Some(StepKind::Persona));
    }

    #[test]
    fn test_sample_is_capped() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 13, 0, 0).unwrap();
        let messages: Vec<Message> = (0..80)
            .map(|i| Message::new(Author::User, format!("message {i}"), ts))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(sample_messages(&messages, 50, &mut rng).len(), 50);
        assert_eq!(sample_messages(&messages[..10], 50, &mut rng).len(), 10);
    }
}
