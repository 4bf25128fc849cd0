//! Tunable engine parameters: factor weights, neutral defaults and keyword sets.
//!
//! Everything here deserializes with per-field defaults, so a partial TOML
//! file only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::error::{FitwiseError, Result};

pub const PERFORMANCE_WEIGHT: f64 = 0.30;
pub const WORKLOAD_WEIGHT: f64 = 0.25;
pub const AVAILABILITY_WEIGHT: f64 = 0.20;
pub const SKILL_MATCH_WEIGHT: f64 = 0.15;
pub const PRIORITY_HANDLING_WEIGHT: f64 = 0.10;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: FactorWeights,
    pub defaults: FactorDefaults,
    pub keywords: KeywordSets,
}

impl EngineConfig {
    /// Trims and lowercases every keyword; text is matched lowercased.
    pub fn normalized(mut self) -> Self {
        self.keywords.normalize();
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.keywords.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub performance: f64,
    pub workload: f64,
    pub availability: f64,
    pub skill_match: f64,
    pub priority_handling: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            performance: PERFORMANCE_WEIGHT,
            workload: WORKLOAD_WEIGHT,
            availability: AVAILABILITY_WEIGHT,
            skill_match: SKILL_MATCH_WEIGHT,
            priority_handling: PRIORITY_HANDLING_WEIGHT,
        }
    }
}

impl FactorWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.performance,
            self.workload,
            self.availability,
            self.skill_match,
            self.priority_handling,
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FitwiseError::Config("weights must be finite and non-negative".into()));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FitwiseError::Config(format!("weights must sum to 1.0 (got {sum:.3})")));
        }
        Ok(())
    }
}

/// Neutral scores used when a factor has nothing to go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorDefaults {
    /// Deliberately below the midpoint so untested users are not over-recommended.
    pub performance_no_history: u32,
    pub workload_no_tasks: u32,
    pub availability_no_due_date: u32,
    pub skill_match_no_history: u32,
    pub priority_handling_no_history: u32,

    pub performance_on_error: u32,
    pub workload_on_error: u32,
    pub availability_on_error: u32,
    pub skill_match_on_error: u32,
    pub priority_handling_on_error: u32,
}

impl Default for FactorDefaults {
    fn default() -> Self {
        Self {
            performance_no_history: 60,
            workload_no_tasks: 100,
            availability_no_due_date: 80,
            skill_match_no_history: 60,
            priority_handling_no_history: 70,

            performance_on_error: 60,
            workload_on_error: 50,
            availability_on_error: 70,
            skill_match_on_error: 60,
            priority_handling_on_error: 70,
        }
    }
}

/// Locale-specific word lists. The defaults are English.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSets {
    pub stop_words: Vec<String>,
    pub complexity: Vec<String>,
    pub high_urgency: Vec<String>,
    pub medium_urgency: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            stop_words: owned(&[
                "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
                "with", "by", "is", "are", "was", "were", "be", "been", "have", "has", "had",
                "do", "does", "did", "will", "would", "could", "should",
            ]),
            complexity: owned(&[
                "integration", "database", "api", "algorithm", "complex", "multiple",
                "migration", "deploy", "test", "refactor", "architecture", "infrastructure",
            ]),
            high_urgency: owned(&[
                "urgent", "critical", "emergency", "asap", "immediately", "bug", "error",
                "crash", "security", "production", "deadline", "client", "customer",
            ]),
            medium_urgency: owned(&[
                "important", "feature", "enhancement", "improvement", "update", "fix",
                "optimize", "performance", "review", "meeting",
            ]),
        }
    }
}

impl KeywordSets {
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.iter().any(|w| w == token)
    }

    pub fn normalize(&mut self) {
        for list in [
            &mut self.stop_words,
            &mut self.complexity,
            &mut self.high_urgency,
            &mut self.medium_urgency,
        ] {
            for word in list.iter_mut() {
                *word = word.trim().to_lowercase();
            }
        }
    }

    fn lists(&self) -> [(&'static str, &[String]); 4] {
        [
            ("stop_words", self.stop_words.as_slice()),
            ("complexity", self.complexity.as_slice()),
            ("high_urgency", self.high_urgency.as_slice()),
            ("medium_urgency", self.medium_urgency.as_slice()),
        ]
    }

    /// A blank keyword would match every text, so it is rejected.
    pub fn validate(&self) -> Result<()> {
        for (name, words) in self.lists() {
            if words.iter().any(|w| w.trim().is_empty()) {
                return Err(FitwiseError::Config(format!("blank keyword in '{name}'")));
            }
            if let Some(w) = words.iter().find(|w| w.as_str() != w.trim().to_lowercase()) {
                return Err(FitwiseError::Config(format!(
                    "keyword '{w}' in '{name}' must be lowercase without surrounding spaces"
                )));
            }
        }
        if let Some(shared) = self
            .high_urgency
            .iter()
            .find(|w| self.medium_urgency.contains(w))
        {
            return Err(FitwiseError::Config(format!(
                "urgency keyword '{shared}' appears in both the high and medium lists"
            )));
        }
        Ok(())
    }
}
