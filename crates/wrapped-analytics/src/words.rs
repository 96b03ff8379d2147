//! Word frequency over user messages.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use wrapped_types::{Message, WordCount};

use crate::stopwords::is_stop_word;

/// Length of the top-word list.
pub const TOP_WORD_LIMIT: usize = 50;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{3,}\b").expect("token pattern is valid"));

/// Word counts for a set of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordStats {
    /// Most frequent words, descending by count; ties keep first-seen order
    pub top: Vec<WordCount>,
    /// Number of distinct counted words
    pub vocabulary_size: usize,
}

/// Lower-cased tokens of 3+ word characters that are neither stop-words
/// nor purely numeric.
pub fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|word| !is_stop_word(word) && !word.chars().all(|c| c.is_numeric()))
}

/// Count words across `messages`, keeping the `limit` most frequent.
pub fn word_frequency<'a>(
    messages: impl IntoIterator<Item = &'a Message>,
    limit: usize,
) -> WordStats {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<WordCount> = Vec::new();

    for message in messages {
        for word in tokens(&message.content) {
            match index.get(&word) {
                Some(&slot) => counts[slot].value += 1,
                None => {
                    index.insert(word.clone(), counts.len());
                    counts.push(WordCount {
                        text: word,
                        value: 1,
                    });
                }
            }
        }
    }

    let vocabulary_size = counts.len();
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.value.cmp(&a.value));
    counts.truncate(limit);

    WordStats {
        top: counts,
        vocabulary_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use wrapped_types::Author;

    fn user(text: &str) -> Message {
        Message::new(Author::User, text, Utc::now())
    }

    #[test]
    fn test_tokens_filter_short_stop_and_numeric() {
        let words: Vec<String> =
            tokens("How do I run the Rust compiler in 2024? It's OK, go 42x").collect();
        assert_eq!(words, vec!["run", "rust", "compiler", "42x"]);
    }

    #[test]
    fn test_counts_sorted_descending() {
        let messages = vec![
            user("python python rust"),
            user("Rust rust cooking"),
            user("python"),
        ];
        let stats = word_frequency(&messages, TOP_WORD_LIMIT);
        assert_eq!(
            stats.top,
            vec![
                WordCount { text: "python".into(), value: 3 },
                WordCount { text: "rust".into(), value: 3 },
                WordCount { text: "cooking".into(), value: 1 },
            ]
        );
        assert_eq!(stats.vocabulary_size, 3);
    }

    #[test]
    fn test_limit_applies_after_sorting() {
        let text: String = (0..60).map(|i| format!("word{i} ")).collect();
        let messages = vec![user(&text), user("word59 word59")];
        let stats = word_frequency(&messages, TOP_WORD_LIMIT);
        assert_eq!(stats.top.len(), 50);
        assert_eq!(stats.top[0].text, "word59");
        assert_eq!(stats.top[0].value, 3);
        assert_eq!(stats.vocabulary_size, 60);
        assert!(stats.top.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_empty_input() {
        let stats = word_frequency(std::iter::empty(), TOP_WORD_LIMIT);
        assert!(stats.top.is_empty());
        assert_eq!(stats.vocabulary_size, 0);
    }
}
