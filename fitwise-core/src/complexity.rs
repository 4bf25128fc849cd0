//! Content-based effort estimate (hours) for a task.
//!
//! Scoring:
//! - base 2h
//! - +1h / +2h / +3h for combined text longer than 100 / 200 / 500 chars
//! - +0.5h per complexity keyword found in the lower-cased text
//! - x1.2 high, x1.0 medium, x0.8 low
//! - clamped to [1, 20], one decimal

use crate::config::KeywordSets;
use crate::task::Priority;

pub const MIN_HOURS: f64 = 1.0;
pub const MAX_HOURS: f64 = 20.0;

const BASE_HOURS: f64 = 2.0;
const HOURS_PER_KEYWORD: f64 = 0.5;

fn length_bonus(chars: usize) -> f64 {
    match chars {
        n if n > 500 => 3.0,
        n if n > 200 => 2.0,
        n if n > 100 => 1.0,
        _ => 0.0,
    }
}

fn priority_factor(priority: Priority) -> f64 {
    match priority {
        Priority::High => 1.2,
        Priority::Medium => 1.0,
        Priority::Low => 0.8,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, Copy)]
pub struct ComplexityEstimator<'a> {
    keywords: &'a KeywordSets,
}

impl<'a> ComplexityEstimator<'a> {
    pub fn new(keywords: &'a KeywordSets) -> Self {
        Self { keywords }
    }

    /// Complexity keywords present in `text` (substring match, case-insensitive).
    pub fn matched_keywords(&self, text: &str) -> Vec<&'a str> {
        let lowered = text.to_lowercase();
        self.keywords
            .complexity
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn estimate_hours(&self, title: &str, description: &str, priority: Priority) -> f64 {
        let chars = title.chars().count() + description.chars().count();
        let content = format!("{title} {description}");
        let keyword_hours = self.matched_keywords(&content).len() as f64 * HOURS_PER_KEYWORD;

        let raw = (BASE_HOURS + length_bonus(chars) + keyword_hours) * priority_factor(priority);
        round_to(raw.clamp(MIN_HOURS, MAX_HOURS), 1)
    }
}
