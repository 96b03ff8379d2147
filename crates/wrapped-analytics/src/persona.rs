//! Persona classification.
//!
//! The catalog is evaluated top to bottom and the first matching detector
//! wins, so earlier entries shadow later, broader ones. When nothing
//! matches, a persona is drawn at random weighted by rarity.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use tracing::debug;

use wrapped_types::{AnalyticsResult, Persona};

/// Predicate over completed analytics.
pub type Detector = fn(&AnalyticsResult) -> bool;

/// One catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct PersonaDefinition {
    pub title: &'static str,
    pub icon: &'static str,
    /// Relative weight for the random fallback
    pub rarity: u32,
    pub description: &'static str,
    /// `None` for fallback-only personas
    pub detector: Option<Detector>,
}

impl PersonaDefinition {
    /// Owned persona for the analytics result.
    pub fn to_persona(&self) -> Persona {
        Persona::new(self.title, self.description, self.icon)
    }

    fn matches(&self, analytics: &AnalyticsResult) -> bool {
        self.detector.is_some_and(|detect| detect(analytics))
    }
}

/// Assigned when the user sent no messages at all.
pub const SILENT_OBSERVER: PersonaDefinition = PersonaDefinition {
    title: "The Silent Observer",
    icon: "🤫",
    rarity: 0,
    description: "You didn't send any messages!",
    detector: None,
};

/// Catalog in evaluation order.
pub static PERSONA_CATALOG: &[PersonaDefinition] = &[
    PersonaDefinition {
        title: "The Conversationalist",
        icon: "💬",
        rarity: 15,
        description: "A master of dialogue with an endless appetite for discussion",
        detector: Some(is_conversationalist),
    },
    PersonaDefinition {
        title: "The Philosopher",
        icon: "🧠",
        rarity: 12,
        description: "Deep thinker who explores abstract concepts and existential questions",
        detector: Some(is_philosopher),
    },
    PersonaDefinition {
        title: "The Night Owl",
        icon: "🌙",
        rarity: 12,
        description: "A creature of the night who finds inspiration in the dark hours",
        detector: Some(is_night_owl),
    },
    PersonaDefinition {
        title: "The Researcher",
        icon: "🔬",
        rarity: 10,
        description: "An investigator of facts, figures, and fascinating information",
        detector: Some(is_researcher),
    },
    PersonaDefinition {
        title: "The Curious Mind",
        icon: "❓",
        rarity: 10,
        description: "Forever asking questions and seeking deeper understanding",
        detector: Some(is_curious_mind),
    },
    PersonaDefinition {
        title: "The Storyteller",
        icon: "📖",
        rarity: 8,
        description: "A weaver of narratives who crafts tales and shares experiences",
        detector: Some(is_storyteller),
    },
    PersonaDefinition {
        title: "The Explorer",
        icon: "🧭",
        rarity: 8,
        description: "An adventurer navigating diverse topics and unexplored territories",
        detector: Some(is_explorer),
    },
    PersonaDefinition {
        title: "The Analyst",
        icon: "📊",
        rarity: 7,
        description: "A data-driven mind breaking down complex problems systematically",
        detector: Some(is_analyst),
    },
    PersonaDefinition {
        title: "The Creative",
        icon: "🎨",
        rarity: 6,
        description: "An artist and innovator channeling imagination into ideas",
        detector: Some(is_creative),
    },
    PersonaDefinition {
        title: "The Time Traveler",
        icon: "⏰",
        rarity: 4,
        description: "A scattered soul with conversations across random moments in time",
        detector: Some(is_time_traveler),
    },
    PersonaDefinition {
        title: "The Polymath",
        icon: "🌟",
        rarity: 4,
        description: "A master of many domains, traversing knowledge across disciplines",
        detector: Some(is_polymath),
    },
    PersonaDefinition {
        title: "The Minimalist",
        icon: "📍",
        rarity: 3,
        description: "Someone who speaks with purpose and brevity, every word counts",
        detector: Some(is_minimalist),
    },
    PersonaDefinition {
        title: "The Nocturnalist",
        icon: "🌑",
        rarity: 2,
        description: "Exclusively a creature of the night, fully embracing the darkness",
        detector: Some(is_nocturnalist),
    },
    PersonaDefinition {
        title: "The Echo",
        icon: "🎯",
        rarity: 1,
        description: "THE SINGULARITY: A perfectly balanced existence, one with the algorithm",
        detector: Some(is_echo),
    },
    PersonaDefinition {
        title: "The Wordsmith",
        icon: "✍️",
        rarity: 9,
        description: "A master of language, crafting eloquent and detailed responses",
        detector: Some(is_wordsmith),
    },
    PersonaDefinition {
        title: "The Code Whisperer",
        icon: "💻",
        rarity: 8,
        description: "A digital sage conversing in algorithms and computational logic",
        detector: Some(is_code_whisperer),
    },
    PersonaDefinition {
        title: "The Morning Person",
        icon: "🌅",
        rarity: 6,
        description: "An early riser who greets each day with enthusiasm and energy",
        detector: Some(is_morning_person),
    },
    PersonaDefinition {
        title: "The Speedrunner",
        icon: "⚡",
        rarity: 7,
        description: "Moving fast and breaking through topics at lightning speed",
        detector: Some(is_speedrunner),
    },
    PersonaDefinition {
        title: "The Perfectionist",
        icon: "✨",
        rarity: 5,
        description: "Always seeking the best answer, refining every detail",
        detector: Some(is_perfectionist),
    },
    PersonaDefinition {
        title: "The Daydreamer",
        icon: "☁️",
        rarity: 6,
        description: "Lost in thought, exploring imaginary worlds and possibilities",
        detector: Some(is_daydreamer),
    },
    PersonaDefinition {
        title: "The Debugger",
        icon: "🐛",
        rarity: 5,
        description: "A problem solver meticulously hunting for issues and solutions",
        detector: Some(is_debugger),
    },
];

static CODE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)code|function|const|import|class|def|sql|api").expect("pattern is valid")
});
static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[{}\[\]()]").expect("pattern is valid"));
static REFINEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)refine|improve|better|perfect|detail").expect("pattern is valid")
});
static TROUBLESHOOTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)error|bug|issue|problem|fix|solve|debug").expect("pattern is valid")
});

fn share_of_total(a: &AnalyticsResult, count: usize) -> f64 {
    if a.total_messages == 0 {
        return 0.0;
    }
    count as f64 / a.total_messages as f64
}

fn any_word_above(a: &AnalyticsResult, words: &[&str], min_exclusive: usize) -> bool {
    a.word_frequency
        .iter()
        .any(|w| words.iter().any(|k| w.text.eq_ignore_ascii_case(k)) && w.value > min_exclusive)
}

fn user_messages_matching(a: &AnalyticsResult, pattern: &Regex) -> usize {
    a.user_messages
        .iter()
        .filter(|m| pattern.is_match(&m.content))
        .count()
}

/// Population variance of the counts.
fn variance(counts: impl Iterator<Item = usize> + Clone) -> Option<(f64, f64)> {
    let n = counts.clone().count();
    if n == 0 {
        return None;
    }
    let mean = counts.clone().sum::<usize>() as f64 / n as f64;
    let var = counts.map(|c| (c as f64 - mean).powi(2)).sum::<f64>() / n as f64;
    Some((mean, var))
}

fn is_conversationalist(a: &AnalyticsResult) -> bool {
    a.user_message_count as f64 > a.assistant_message_count as f64 * 0.7
        && a.total_messages > 1000
}

fn is_philosopher(a: &AnalyticsResult) -> bool {
    any_word_above(a, &["think", "meaning", "question", "understand", "concept"], 5)
}

fn is_night_owl(a: &AnalyticsResult) -> bool {
    share_of_total(a, a.messages_in_hours(22, 5)) > 0.3
}

fn is_researcher(a: &AnalyticsResult) -> bool {
    a.vocabulary_size > 100 && a.avg_messages_per_convo > 12.0
}

fn is_curious_mind(a: &AnalyticsResult) -> bool {
    share_of_total(a, a.user_question_count()) > 0.25
}

fn is_storyteller(a: &AnalyticsResult) -> bool {
    a.user_messages.iter().any(|m| m.char_len() > 500) && a.avg_messages_per_convo > 15.0
}

fn is_explorer(a: &AnalyticsResult) -> bool {
    a.vocabulary_size > 150 && a.total_conversations > 50
}

fn is_analyst(a: &AnalyticsResult) -> bool {
    any_word_above(a, &["analyze", "data", "pattern", "metric", "logic"], 3)
}

fn is_creative(a: &AnalyticsResult) -> bool {
    any_word_above(a, &["create", "design", "art", "music", "write", "imagine"], 2)
}

/// Long history touched on few days.
fn is_time_traveler(a: &AnalyticsResult) -> bool {
    let span_days = (a.last_chat_date - a.first_chat_date).num_days();
    span_days > 100 && (a.active_days as i64) * 10 < span_days
}

fn is_polymath(a: &AnalyticsResult) -> bool {
    a.vocabulary_size > 200 && a.total_messages > 2000 && a.total_conversations > 100
}

fn is_minimalist(a: &AnalyticsResult) -> bool {
    a.avg_messages_per_convo < 8.0 && a.user_message_count < 200
}

fn is_nocturnalist(a: &AnalyticsResult) -> bool {
    share_of_total(a, a.messages_in_hours(23, 4)) > 0.75
}

fn is_echo(a: &AnalyticsResult) -> bool {
    if a.total_messages <= 5000 || a.vocabulary_size <= 300 {
        return false;
    }
    let balanced_hours = variance(a.hourly_activity.iter().map(|h| h.count))
        .is_some_and(|(mean, var)| var < mean * 0.5);
    let balanced_days = variance(a.daily_activity.iter().map(|d| d.count))
        .is_some_and(|(mean, var)| var < mean * 0.3);
    balanced_hours && balanced_days
}

fn is_wordsmith(a: &AnalyticsResult) -> bool {
    let long = a
        .user_messages
        .iter()
        .filter(|m| m.content.split(' ').count() > 50)
        .count();
    share_of_total(a, long) > 0.3
}

fn is_code_whisperer(a: &AnalyticsResult) -> bool {
    a.user_messages.iter().any(|m| CODE_KEYWORDS.is_match(&m.content))
        && share_of_total(a, user_messages_matching(a, &BRACKETS)) > 0.15
}

fn is_morning_person(a: &AnalyticsResult) -> bool {
    share_of_total(a, a.messages_in_hours(5, 11)) > 0.35
}

fn is_speedrunner(a: &AnalyticsResult) -> bool {
    a.total_messages > 3000 && a.total_conversations > 150 && a.avg_messages_per_convo < 12.0
}

fn is_perfectionist(a: &AnalyticsResult) -> bool {
    user_messages_matching(a, &REFINEMENT) > 5
}

fn is_daydreamer(a: &AnalyticsResult) -> bool {
    any_word_above(a, &["imagine", "dream", "suppose", "maybe", "perhaps"], 2)
}

fn is_debugger(a: &AnalyticsResult) -> bool {
    user_messages_matching(a, &TROUBLESHOOTING) > 5
}

/// Catalog sorted by rarity weight, most common first.
pub fn all_personas() -> Vec<PersonaDefinition> {
    let mut personas = PERSONA_CATALOG.to_vec();
    personas.sort_by(|a, b| b.rarity.cmp(&a.rarity));
    personas
}

/// Look up a catalog entry (or the no-activity persona) by exact title.
pub fn persona_by_title(title: &str) -> Option<PersonaDefinition> {
    PERSONA_CATALOG
        .iter()
        .chain(std::iter::once(&SILENT_OBSERVER))
        .find(|p| p.title == title)
        .copied()
}

/// Rule-based persona selection with a weighted random fallback.
#[derive(Debug, Clone)]
pub struct PersonaClassifier {
    catalog: Vec<PersonaDefinition>,
}

impl Default for PersonaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaClassifier {
    /// Classifier over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(PERSONA_CATALOG.to_vec())
    }

    /// Classifier over a custom catalog, evaluated in the given order.
    pub fn with_catalog(catalog: Vec<PersonaDefinition>) -> Self {
        Self { catalog }
    }

    /// Classify using the thread-local random generator for the fallback.
    pub fn classify(&self, analytics: &AnalyticsResult) -> Persona {
        self.classify_with_rng(analytics, &mut rand::rng())
    }

    /// Classify with an explicit random source for the fallback.
    pub fn classify_with_rng<R: Rng + ?Sized>(
        &self,
        analytics: &AnalyticsResult,
        rng: &mut R,
    ) -> Persona {
        self.select(analytics, rng).to_persona()
    }

    fn select<R: Rng + ?Sized>(&self, analytics: &AnalyticsResult, rng: &mut R) -> PersonaDefinition {
        if analytics.user_message_count == 0 {
            return SILENT_OBSERVER;
        }

        if let Some(hit) = self.catalog.iter().find(|p| p.matches(analytics)) {
            debug!(persona = hit.title, "Persona detector matched");
            return *hit;
        }

        let picked = self.weighted_pick(rng);
        debug!(persona = picked.title, "No detector matched, drew weighted persona");
        picked
    }

    fn weighted_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> PersonaDefinition {
        let total: u32 = self.catalog.iter().map(|p| p.rarity).sum();
        if total == 0 {
            return self.catalog.first().copied().unwrap_or(SILENT_OBSERVER);
        }

        let mut draw = rng.random_range(0..total);
        for persona in &self.catalog {
            if draw < persona.rarity {
                return *persona;
            }
            draw -= persona.rarity;
        }
        self.catalog.first().copied().unwrap_or(SILENT_OBSERVER)
    }
}
