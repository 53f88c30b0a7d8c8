use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::constants::{KEYWORD_LIMIT, MIN_KEYWORD_LEN};

static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "should", "could", "can", "may", "might", "must",
];

/// Extract ranking keywords from a prompt.
///
/// Lowercases, strips non-alphanumerics to whitespace, drops stop words and
/// tokens shorter than MIN_KEYWORD_LEN, deduplicates in first-seen order, and
/// keeps the first KEYWORD_LIMIT.
pub fn extract_keywords(prompt: &str) -> Vec<String> {
    let lowered = prompt.to_lowercase();
    let cleaned = NON_ALNUM.replace_all(&lowered, " ");
    let mut seen = HashSet::new();

    cleaned
        .split_whitespace()
        .filter(|t| t.len() >= MIN_KEYWORD_LEN && !STOP_WORDS.contains(t))
        .filter(|t| seen.insert(t.to_string()))
        .take(KEYWORD_LIMIT)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extraction() {
        let kws = extract_keywords("Explain quantum physics");
        assert_eq!(kws, vec!["explain", "quantum", "physics"]);
    }

    #[test]
    fn test_stop_words_dropped() {
        let kws = extract_keywords("the history of the world");
        assert_eq!(kws, vec!["history", "world"]);
    }

    #[test]
    fn test_short_tokens_dropped() {
        let kws = extract_keywords("add 3 and 4");
        assert_eq!(kws, vec!["add"]);
    }

    #[test]
    fn test_punctuation_stripped() {
        let kws = extract_keywords("what's art? (literature!)");
        // apostrophe splits "what's" into "what" and "s"
        assert_eq!(kws, vec!["what", "art", "literature"]);
    }

    #[test]
    fn test_dedup_first_seen_order() {
        let kws = extract_keywords("math logic math proof logic");
        assert_eq!(kws, vec!["math", "logic", "proof"]);
    }

    #[test]
    fn test_limit_six() {
        let kws = extract_keywords("alpha beta gamma delta epsilon zeta eta theta");
        assert_eq!(kws.len(), 6);
        assert_eq!(kws[5], "zeta");
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   \t ").is_empty());
    }

    #[test]
    fn test_all_filtered() {
        assert!(extract_keywords("is it to be or").is_empty());
    }
}
