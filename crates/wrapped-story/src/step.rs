//! Presentation-agnostic story steps.

use serde::{Deserialize, Serialize};

use wrapped_analytics::TriviaQuestion;
use wrapped_types::{DayCount, HourCount, MonthCount};

/// Visual theme descriptor attached to every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub secondary_color: String,
    pub animation: String,
    pub background: String,
}

/// Color pairs and background effects, cycled by step position.
const PALETTE: [(&str, &str, &str); 6] = [
    ("#a855f7", "#ec4899", "starfield"),
    ("#3b82f6", "#06b6d4", "waves"),
    ("#f59e0b", "#ef4444", "sunburst"),
    ("#10b981", "#84cc16", "aurora"),
    ("#6366f1", "#a855f7", "grid"),
    ("#f43f5e", "#fb923c", "confetti"),
];

impl Theme {
    /// Theme for the step at `position` of the given kind.
    pub fn for_step(position: usize, kind: StepKind) -> Self {
        let (primary, secondary, background) = PALETTE[position % PALETTE.len()];
        Self {
            primary_color: primary.to_string(),
            secondary_color: secondary.to_string(),
            animation: kind.animation().to_string(),
            background: background.to_string(),
        }
    }
}

/// Step discriminant without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Stat,
    Chart,
    Trivia,
    Persona,
}

impl StepKind {
    fn animation(self) -> &'static str {
        match self {
            StepKind::Stat => "fade-up",
            StepKind::Chart => "slide-in",
            StepKind::Trivia => "pop",
            StepKind::Persona => "reveal",
        }
    }
}

/// One bar of a chart step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub count: usize,
}

impl From<&DayCount> for ChartPoint {
    fn from(d: &DayCount) -> Self {
        Self {
            label: d.day.clone(),
            count: d.count,
        }
    }
}

impl From<&HourCount> for ChartPoint {
    fn from(h: &HourCount) -> Self {
        Self {
            label: h.hour.clone(),
            count: h.count,
        }
    }
}

impl From<&MonthCount> for ChartPoint {
    fn from(m: &MonthCount) -> Self {
        Self {
            label: m.month.clone(),
            count: m.count,
        }
    }
}

/// A single slide of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    /// Headline number with a sentence
    Stat {
        title: String,
        value: String,
        description: String,
        icon: String,
        theme: Theme,
    },
    /// Bar chart over a histogram
    Chart {
        title: String,
        data: Vec<ChartPoint>,
        description: String,
        icon: String,
        theme: Theme,
    },
    /// Multiple-choice question
    Trivia {
        title: String,
        question: TriviaQuestion,
        theme: Theme,
    },
    /// Final persona reveal
    Persona {
        title: String,
        persona_title: String,
        description: String,
        icon: String,
        theme: Theme,
    },
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Stat { .. } => StepKind::Stat,
            Step::Chart { .. } => StepKind::Chart,
            Step::Trivia { .. } => StepKind::Trivia,
            Step::Persona { .. } => StepKind::Persona,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Step::Stat { title, .. }
            | Step::Chart { title, .. }
            | Step::Trivia { title, .. }
            | Step::Persona { title, .. } => title,
        }
    }

    pub fn theme(&self) -> &Theme {
        match self {
            Step::Stat { theme, .. }
            | Step::Chart { theme, .. }
            | Step::Trivia { theme, .. }
            | Step::Persona { theme, .. } => theme,
        }
    }

    /// Body text, if the step has one.
    pub fn description(&self) -> Option<&str> {
        match self {
            Step::Stat { description, .. }
            | Step::Chart { description, .. }
            | Step::Persona { description, .. } => Some(description),
            Step::Trivia { .. } => None,
        }
    }
}
