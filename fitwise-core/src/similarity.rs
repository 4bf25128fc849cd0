//! Keyword extraction and Jaccard similarity between task texts.
//!
//! Deterministic and position-based: the first ten salient tokens of a text are
//! its keywords, no frequency ranking.

use std::collections::HashSet;

use crate::config::KeywordSets;

pub const MAX_KEYWORDS: usize = 10;
const MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct ContentSimilarity<'a> {
    keywords: &'a KeywordSets,
}

impl<'a> ContentSimilarity<'a> {
    pub fn new(keywords: &'a KeywordSets) -> Self {
        Self { keywords }
    }

    /// Lazily yields keywords in order of occurrence. Calling again restarts.
    pub fn keywords<'t>(&self, text: &'t str) -> impl Iterator<Item = String> + use<'a, 't> {
        let stop = self.keywords;
        text.split_whitespace()
            .map(str::to_lowercase)
            .filter(move |t| t.chars().count() >= MIN_TOKEN_CHARS && !stop.is_stop_word(t))
            .take(MAX_KEYWORDS)
    }

    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        self.keywords(text).collect()
    }

    /// Jaccard index of the two keyword sets, in [0, 1].
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let left: HashSet<String> = self.keywords(a).collect();
        let right: HashSet<String> = self.keywords(b).collect();
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }

        let intersection = left.intersection(&right).count();
        let union = left.union(&right).count();
        if union == 0 {
            return 0.0;
        }
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_drops_stop_words_and_short_tokens() {
        let k = KeywordSets::default();
        let sim = ContentSimilarity::new(&k);
        let kw = sim.extract_keywords("Fix the DB migration for an API");
        assert_eq!(kw, vec!["fix", "migration", "api"]);
    }

    #[test]
    fn extraction_keeps_first_ten_in_order() {
        let k = KeywordSets::default();
        let sim = ContentSimilarity::new(&k);
        let text = (1..=15).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let kw = sim.extract_keywords(&text);
        assert_eq!(kw.len(), MAX_KEYWORDS);
        assert_eq!(kw.first().map(String::as_str), Some("word1"));
        assert_eq!(kw.last().map(String::as_str), Some("word10"));
    }

    #[test]
    fn keyword_iterator_is_restartable() {
        let k = KeywordSets::default();
        let sim = ContentSimilarity::new(&k);
        let text = "deploy payment service";
        let first: Vec<String> = sim.keywords(text).collect();
        let second: Vec<String> = sim.keywords(text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn identical_text_is_fully_similar() {
        let k = KeywordSets::default();
        let sim = ContentSimilarity::new(&k);
        assert_eq!(sim.similarity("Refactor billing module", "Refactor billing module"), 1.0);
    }

    #[test]
    fn empty_or_stopword_text_is_zero() {
        let k = KeywordSets::default();
        let sim = ContentSimilarity::new(&k);
        assert_eq!(sim.similarity("", ""), 0.0);
        assert_eq!(sim.similarity("the and of", "was were been"), 0.0);
        assert_eq!(sim.similarity("billing report", ""), 0.0);
    }

    #[test]
    fn partial_overlap_is_jaccard() {
        let k = KeywordSets::default();
        let sim = ContentSimilarity::new(&k);
        // {billing, report} vs {billing, export}: 1 / 3
        let s = sim.similarity("billing report", "billing export");
        assert!((s - 1.0 / 3.0).abs() < 1e-12);
    }
}
