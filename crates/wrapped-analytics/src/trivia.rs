//! Multiple-choice trivia derived from analytics.
//!
//! Each strategy falls back to a simpler one when its signal is too sparse;
//! every chain ends at [`TriviaStrategy::MessageLength`], which always has an
//! answer.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use wrapped_types::AnalyticsResult;

/// Number of options in every question.
pub const OPTION_COUNT: usize = 4;

/// Generic words used to pad word-based questions.
const DISTRACTORS: [&str; 6] = [
    "python",
    "javascript",
    "analysis",
    "design",
    "workflow",
    "strategy",
];

const CREATIVE_WORDS: [&str; 6] = ["design", "create", "art", "music", "write", "creative"];
const TECH_WORDS: [&str; 6] = ["code", "python", "function", "api", "database", "server"];
const ANALYSIS_WORDS: [&str; 6] = ["data", "analyze", "metric", "trend", "pattern", "insight"];

/// A generated question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaQuestion {
    pub question: String,
    /// Exactly four distinct options
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

impl TriviaQuestion {
    /// The option at `correct_answer_index`.
    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct_answer_index).map(String::as_str)
    }
}

/// Question families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaStrategy {
    /// Most frequent word, padded with distractors
    TopWord,
    /// One of the most discussed topics among the top four words
    Topic,
    /// Question-heavy vs statement-heavy
    ConversationStyle,
    /// Theme guessed from the top five words
    CommonTheme,
    /// Average user message length bucket
    MessageLength,
}

impl TriviaStrategy {
    pub const ALL: [TriviaStrategy; 5] = [
        TriviaStrategy::TopWord,
        TriviaStrategy::Topic,
        TriviaStrategy::ConversationStyle,
        TriviaStrategy::CommonTheme,
        TriviaStrategy::MessageLength,
    ];

    /// Build a question with this strategy, degrading when data is sparse.
    pub fn generate<R: Rng + ?Sized>(self, a: &AnalyticsResult, rng: &mut R) -> TriviaQuestion {
        let words = a.word_frequency.len();
        match self {
            TriviaStrategy::TopWord if words < 2 => TriviaStrategy::CommonTheme.generate(a, rng),
            TriviaStrategy::TopWord => top_word(a, rng),
            TriviaStrategy::Topic if words < OPTION_COUNT => {
                TriviaStrategy::ConversationStyle.generate(a, rng)
            }
            TriviaStrategy::Topic => topic(a, rng),
            TriviaStrategy::ConversationStyle if a.user_messages.is_empty() => {
                TriviaStrategy::MessageLength.generate(a, rng)
            }
            TriviaStrategy::ConversationStyle => conversation_style(a, rng),
            TriviaStrategy::CommonTheme if words < 3 => {
                TriviaStrategy::MessageLength.generate(a, rng)
            }
            TriviaStrategy::CommonTheme => common_theme(a, rng),
            TriviaStrategy::MessageLength => message_length(a, rng),
        }
    }
}

/// Generate one question using the thread-local random generator.
pub fn generate_trivia(analytics: &AnalyticsResult) -> TriviaQuestion {
    generate_trivia_with_rng(analytics, &mut rand::rng())
}

/// Generate one question with an explicit random source.
pub fn generate_trivia_with_rng<R: Rng + ?Sized>(
    analytics: &AnalyticsResult,
    rng: &mut R,
) -> TriviaQuestion {
    let strategy = TriviaStrategy::ALL[rng.random_range(0..TriviaStrategy::ALL.len())];
    debug!(?strategy, "Generating trivia");
    strategy.generate(analytics, rng)
}

/// Assemble four distinct shuffled options around `correct`.
///
/// `candidates` are used in order; missing slots are filled with random
/// distractors.
fn assemble<R: Rng + ?Sized>(
    question: &str,
    correct: String,
    candidates: impl IntoIterator<Item = String>,
    rng: &mut R,
) -> TriviaQuestion {
    let mut options = vec![correct.clone()];
    for candidate in candidates {
        if options.len() == OPTION_COUNT {
            break;
        }
        if !options.contains(&candidate) {
            options.push(candidate);
        }
    }

    let mut pool = DISTRACTORS.to_vec();
    pool.shuffle(rng);
    for distractor in pool {
        if options.len() == OPTION_COUNT {
            break;
        }
        if !options.iter().any(|o| o == distractor) {
            options.push(distractor.to_string());
        }
    }

    options.shuffle(rng);
    let correct_answer_index = options.iter().position(|o| *o == correct).unwrap_or(0);

    TriviaQuestion {
        question: question.to_string(),
        options,
        correct_answer_index,
    }
}

fn top_word<R: Rng + ?Sized>(a: &AnalyticsResult, rng: &mut R) -> TriviaQuestion {
    let correct = a.word_frequency[0].text.clone();
    let others = a.word_frequency[1..]
        .iter()
        .take(3)
        .map(|w| w.text.clone())
        .collect::<Vec<_>>();
    assemble(
        "Which word did you use most frequently in your conversations?",
        correct,
        others,
        rng,
    )
}

fn topic<R: Rng + ?Sized>(a: &AnalyticsResult, rng: &mut R) -> TriviaQuestion {
    let correct = a.word_frequency[0].text.clone();
    let others = a.word_frequency[1..OPTION_COUNT]
        .iter()
        .map(|w| w.text.clone())
        .collect::<Vec<_>>();
    assemble("What was one of your most discussed topics?", correct, others, rng)
}

fn conversation_style<R: Rng + ?Sized>(a: &AnalyticsResult, rng: &mut R) -> TriviaQuestion {
    let percentage =
        (a.user_question_count() as f64 / a.user_messages.len() as f64 * 100.0).round();
    let style = if percentage > 50.0 {
        "Question-Heavy"
    } else if percentage < 20.0 {
        "Statement-Heavy"
    } else {
        "Conversational"
    };

    assemble(
        "Which best describes your conversation style?",
        style.to_string(),
        ["Technical-Focused", "Abstract-Focused", "Detail-Oriented"].map(String::from),
        rng,
    )
}

fn common_theme<R: Rng + ?Sized>(a: &AnalyticsResult, rng: &mut R) -> TriviaQuestion {
    let top: Vec<String> = a.top_words(5).into_iter().map(|w| w.to_lowercase()).collect();
    let has_any = |set: &[&str]| top.iter().any(|w| set.contains(&w.as_str()));

    let theme = if has_any(&CREATIVE_WORDS) {
        "Creative Projects"
    } else if has_any(&TECH_WORDS) {
        "Technical Topics"
    } else if has_any(&ANALYSIS_WORDS) {
        "Data & Analysis"
    } else {
        "General Discussion"
    };

    assemble(
        "What was a primary theme in your conversations?",
        theme.to_string(),
        [
            "Creative Projects",
            "Technical Topics",
            "Data & Analysis",
            "General Discussion",
        ]
        .map(String::from),
        rng,
    )
}

fn message_length<R: Rng + ?Sized>(a: &AnalyticsResult, rng: &mut R) -> TriviaQuestion {
    let average = a.average_user_message_length();
    let pattern = if average > 300.0 {
        "Detailed"
    } else if average > 100.0 {
        "Moderate"
    } else {
        "Concise"
    };

    assemble(
        "How would you describe the length of your typical message?",
        pattern.to_string(),
        ["Concise", "Moderate", "Detailed", "Elaborate"].map(String::from),
        rng,
    )
}
