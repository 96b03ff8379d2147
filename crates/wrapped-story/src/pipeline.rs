//! End-to-end run: parse, aggregate, compose, encode.

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use wrapped_analytics::{Aggregator, Bucketing};
use wrapped_parsers::parser_for;
use wrapped_types::{AnalyticsResult, Platform, Settings, WrappedError};

use crate::composer::StoryComposer;
use crate::generator::{self, TextGenerator};
use crate::share::encode_share_token;
use crate::step::Step;

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedReport {
    pub analytics: AnalyticsResult,
    pub story: Vec<Step>,
    pub share_token: String,
}

/// Parse → aggregate → classify → compose, once per input document.
#[derive(Clone)]
pub struct WrappedPipeline {
    composer: StoryComposer,
    bucketing: Bucketing,
    seed: Option<u64>,
}

impl WrappedPipeline {
    /// Pipeline bucketing in UTC with unseeded randomness.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            composer: StoryComposer::new(generator),
            bucketing: Bucketing::utc(),
            seed: None,
        }
    }

    /// Build from layered settings.
    ///
    /// `offline` skips the text-generation service entirely. Without an
    /// explicit `utc_offset_minutes`, each message is bucketed in the
    /// machine's time zone at its own instant.
    pub fn from_settings(settings: &Settings, offline: bool) -> Result<Self, WrappedError> {
        let generator = generator::from_settings(&settings.generator, offline)
            .map_err(|e| WrappedError::config(e.to_string()))?;

        let bucketing = match settings.utc_offset_minutes {
            Some(minutes) => Bucketing::Fixed(FixedOffset::east_opt(minutes * 60).ok_or_else(
                || WrappedError::config(format!("utc_offset_minutes {minutes} is out of range")),
            )?),
            None => Bucketing::Local,
        };

        let composer = StoryComposer::new(generator)
            .with_timeout(Duration::from_secs(settings.generator.timeout_secs))
            .with_sample_size(settings.topic_sample_size);

        Ok(Self {
            composer,
            bucketing: Bucketing::utc(),
            seed: settings.seed,
        }
        .with_bucketing(bucketing))
    }

    /// Bucket and format dates at a fixed offset from UTC.
    pub fn with_offset(self, offset: FixedOffset) -> Self {
        self.with_bucketing(Bucketing::Fixed(offset))
    }

    /// Zone for calendar buckets and story dates.
    pub fn with_bucketing(mut self, bucketing: Bucketing) -> Self {
        self.bucketing = bucketing;
        self.composer = self.composer.with_bucketing(bucketing);
        self
    }

    /// Seed persona fallback, sampling and trivia.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the whole pipeline over one export document.
    ///
    /// Parse and aggregation errors propagate; text generation never fails
    /// the run.
    pub async fn run(&self, raw: &str, platform: &str) -> Result<WrappedReport, WrappedError> {
        let platform: Platform = platform.parse()?;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let conversations = parser_for(platform).parse(raw)?;
        let analytics = Aggregator::new(platform)
            .with_bucketing(self.bucketing)
            .aggregate_with_rng(&conversations, &mut rng)?;
        let story = self.composer.compose_with_rng(&analytics, &mut rng).await;
        let share_token = encode_share_token(&analytics)?;

        info!(
            platform = %platform,
            steps = story.len(),
            persona = %analytics.user_persona.title,
            "Wrapped report ready"
        );

        Ok(WrappedReport {
            analytics,
            story,
            share_token,
        })
    }
}
