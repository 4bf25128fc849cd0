//! Weighted suitability scoring and ranking of candidates.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use crate::config::{EngineConfig, FactorWeights};
use crate::factors::{FactorCalculator, UserFactors};
use crate::store::TaskStore;
use crate::task::{TaskDraft, User, UserId};

pub const HIGHLY_RECOMMENDED_MIN: u32 = 85;
pub const RECOMMENDED_MIN: u32 = 70;
pub const SUITABLE_MIN: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationTier {
    HighlyRecommended,
    Recommended,
    Suitable,
    NotRecommended,
}

impl RecommendationTier {
    /// Thresholds are inclusive: 85, 70 and 50 map to the higher tier.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= HIGHLY_RECOMMENDED_MIN => Self::HighlyRecommended,
            s if s >= RECOMMENDED_MIN => Self::Recommended,
            s if s >= SUITABLE_MIN => Self::Suitable,
            _ => Self::NotRecommended,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "highly-recommended",
            Self::Recommended => "recommended",
            Self::Suitable => "suitable",
            Self::NotRecommended => "not-recommended",
        }
    }
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityScore {
    pub user_id: UserId,
    pub user_name: String,
    /// 0-100.
    pub score: u32,
    pub factors: UserFactors,
    pub tier: RecommendationTier,
    pub rationale: String,
}

pub fn composite_score(factors: &UserFactors, weights: &FactorWeights) -> u32 {
    let weighted: f64 = factors
        .as_array()
        .iter()
        .zip(weights.as_array())
        .map(|(score, weight)| f64::from(*score) * weight)
        .sum();
    weighted.round().clamp(0.0, 100.0) as u32
}

pub fn rationale(factors: &UserFactors, tier: RecommendationTier) -> String {
    let mut reasons: Vec<&str> = Vec::new();

    if factors.performance >= 80 {
        reasons.push("excellent track record");
    } else if factors.performance >= 60 {
        reasons.push("good performance history");
    }

    if factors.workload >= 80 {
        reasons.push("low current workload");
    } else if factors.workload < 40 {
        reasons.push("high current workload");
    }

    if factors.availability >= 80 {
        reasons.push("good availability");
    } else if factors.availability < 50 {
        reasons.push("limited availability");
    }

    if factors.skill_match >= 70 {
        reasons.push("relevant experience");
    }

    if factors.priority_handling >= 80 {
        reasons.push("strong with this priority level");
    }

    if reasons.is_empty() {
        return match tier {
            RecommendationTier::NotRecommended => "May not be the best fit".to_string(),
            _ => "Suitable for assignment".to_string(),
        };
    }
    reasons.join(", ")
}

pub struct SuitabilityScorer<'a> {
    store: &'a dyn TaskStore,
    config: &'a EngineConfig,
}

impl<'a> SuitabilityScorer<'a> {
    pub fn new(store: &'a dyn TaskStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub async fn score_user(&self, user: &User, draft: &TaskDraft, now: DateTime<Utc>) -> SuitabilityScore {
        let factors = FactorCalculator::new(self.store, self.config)
            .compute(user.id, draft, now)
            .await;
        let score = composite_score(&factors, &self.config.weights);
        let tier = RecommendationTier::from_score(score);
        debug!(user = user.id, score, %tier, "candidate scored");

        SuitabilityScore {
            user_id: user.id,
            user_name: user.name.clone(),
            score,
            factors,
            tier,
            rationale: rationale(&factors, tier),
        }
    }

    /// Score every non-admin candidate concurrently, best first.
    ///
    /// `join_all` keeps input order and the sort is stable, so equal scores
    /// stay in the order the candidates were given.
    #[instrument(skip_all, fields(candidates = users.len()))]
    pub async fn rank(&self, users: &[User], draft: &TaskDraft, now: DateTime<Utc>) -> Vec<SuitabilityScore> {
        let scoring = users
            .iter()
            .filter(|u| !u.is_admin())
            .map(|u| self.score_user(u, draft, now));
        let mut scores = join_all(scoring).await;
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }
}
