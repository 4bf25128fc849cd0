//! Per-candidate suitability factors.
//!
//! Five independent 0-100 scores, recomputed from history on every request:
//! - performance: recent efficiency, completion rate, trend
//! - workload: active and overdue tasks (higher = lighter load)
//! - availability: other deadlines near the prospective due date
//! - skill match: text similarity with recently completed tasks
//! - priority handling: efficiency on past tasks of the same priority
//!
//! A failed lookup never fails the factor: it is logged and replaced by the
//! configured neutral default.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::{self, CompletionRecord};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::similarity::ContentSimilarity;
use crate::store::{DueWindow, TaskFilter, TaskStore};
use crate::task::{TaskDraft, TaskStatus, UserId};

const PERFORMANCE_WINDOW: usize = 20;
const TREND_WINDOW: usize = 5;
const TREND_DECLINE_RATIO: f64 = 0.9;
const TREND_UP: f64 = 1.1;
const TREND_DOWN: f64 = 0.9;

const WORKLOAD_PER_ACTIVE: i64 = 12;
const WORKLOAD_PER_OVERDUE: i64 = 15;

const CONFLICT_WINDOW_DAYS: i64 = 3;
const AVAILABILITY_PER_CONFLICT: i64 = 20;
const URGENT_DAYS: i64 = 2;
const RELAXED_DAYS: i64 = 14;

const HISTORY_SAMPLE: usize = 10;
const PRIORITY_EFFICIENCY_SCALE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFactors {
    pub performance: u32,
    pub workload: u32,
    pub availability: u32,
    pub skill_match: u32,
    pub priority_handling: u32,
}

impl UserFactors {
    /// Scores in weight order: performance, workload, availability, skill, priority.
    pub fn as_array(&self) -> [u32; 5] {
        [
            self.performance,
            self.workload,
            self.availability,
            self.skill_match,
            self.priority_handling,
        ]
    }
}

fn clamp_score(value: f64, min: f64, max: f64) -> u32 {
    value.clamp(min, max).round() as u32
}

/// x1.1 when the latest five beat the five before, x0.9 on a >10% drop.
/// Needs at least ten records (newest first); otherwise neutral.
pub fn trend_multiplier(records: &[CompletionRecord]) -> f64 {
    if records.len() < TREND_WINDOW * 2 {
        return 1.0;
    }
    let (Some(recent), Some(previous)) = (
        completion::average_efficiency(&records[..TREND_WINDOW]),
        completion::average_efficiency(&records[TREND_WINDOW..TREND_WINDOW * 2]),
    ) else {
        return 1.0;
    };

    if recent > previous {
        TREND_UP
    } else if recent < previous * TREND_DECLINE_RATIO {
        TREND_DOWN
    } else {
        1.0
    }
}

pub struct FactorCalculator<'a> {
    store: &'a dyn TaskStore,
    config: &'a EngineConfig,
}

impl<'a> FactorCalculator<'a> {
    pub fn new(store: &'a dyn TaskStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub async fn compute(&self, user: UserId, draft: &TaskDraft, now: DateTime<Utc>) -> UserFactors {
        let (performance, workload, availability, skill_match, priority_handling) = futures::join!(
            self.performance(user),
            self.workload(user, now),
            self.availability(user, draft.due_date, now),
            self.skill_match(user, draft),
            self.priority_handling(user, draft),
        );

        let factors = UserFactors {
            performance,
            workload,
            availability,
            skill_match,
            priority_handling,
        };
        debug!(user, ?factors, "user factors computed");
        factors
    }

    fn absorb(&self, factor: &'static str, user: UserId, result: Result<u32>, fallback: u32) -> u32 {
        match result {
            Ok(score) => score,
            Err(err) => {
                warn!(user, factor, error = %err, fallback, "factor lookup failed; using neutral default");
                fallback
            }
        }
    }

    pub async fn performance(&self, user: UserId) -> u32 {
        let result = self.try_performance(user).await;
        self.absorb("performance", user, result, self.config.defaults.performance_on_error)
    }

    async fn try_performance(&self, user: UserId) -> Result<u32> {
        let records = self.store.recent_completions(user, PERFORMANCE_WINDOW).await?;
        let Some(avg_efficiency) = completion::average_efficiency(&records) else {
            return Ok(self.config.defaults.performance_no_history);
        };

        let assigned = self.store.count_tasks(&TaskFilter::new().assigned_to(user)).await?;
        let completion_rate = if assigned > 0 {
            (records.len() as f64 / assigned as f64).min(1.0)
        } else {
            1.0
        };

        let raw = avg_efficiency * 40.0 + completion_rate * 40.0 + 20.0;
        Ok(clamp_score(raw * trend_multiplier(&records), 10.0, 100.0))
    }

    pub async fn workload(&self, user: UserId, now: DateTime<Utc>) -> u32 {
        let result = self.try_workload(user, now).await;
        self.absorb("workload", user, result, self.config.defaults.workload_on_error)
    }

    async fn try_workload(&self, user: UserId, now: DateTime<Utc>) -> Result<u32> {
        let open = self
            .store
            .list_tasks(&TaskFilter::new().assigned_to(user).active())
            .await?;
        let active = open.len() as i64;
        let overdue = open.iter().filter(|t| t.is_overdue(now)).count() as i64;

        let mut score = if active > 0 {
            (100 - active * WORKLOAD_PER_ACTIVE).max(10)
        } else {
            i64::from(self.config.defaults.workload_no_tasks)
        };
        score -= overdue * WORKLOAD_PER_OVERDUE;
        Ok(score.clamp(10, 100) as u32)
    }

    pub async fn availability(&self, user: UserId, due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
        let Some(due) = due else {
            return self.config.defaults.availability_no_due_date;
        };
        let result = self.try_availability(user, due, now).await;
        self.absorb("availability", user, result, self.config.defaults.availability_on_error)
    }

    async fn try_availability(&self, user: UserId, due: DateTime<Utc>, now: DateTime<Utc>) -> Result<u32> {
        let window = Duration::days(CONFLICT_WINDOW_DAYS);
        let conflicts = self
            .store
            .count_tasks(
                &TaskFilter::new()
                    .assigned_to(user)
                    .active()
                    .due_within(DueWindow::Between(due - window, due + window)),
            )
            .await? as i64;

        let days_until_due = crate::time::days_until(now, due);
        let mut score = 100 - conflicts * AVAILABILITY_PER_CONFLICT;
        if days_until_due < URGENT_DAYS {
            score -= 20;
        } else if days_until_due > RELAXED_DAYS {
            score += 10;
        }
        Ok(score.clamp(20, 100) as u32)
    }

    pub async fn skill_match(&self, user: UserId, draft: &TaskDraft) -> u32 {
        let result = self.try_skill_match(user, draft).await;
        self.absorb("skill_match", user, result, self.config.defaults.skill_match_on_error)
    }

    async fn try_skill_match(&self, user: UserId, draft: &TaskDraft) -> Result<u32> {
        let history = self
            .store
            .list_tasks(
                &TaskFilter::new()
                    .assigned_to(user)
                    .with_status(TaskStatus::Completed)
                    .limit(HISTORY_SAMPLE),
            )
            .await?;
        if history.is_empty() {
            return Ok(self.config.defaults.skill_match_no_history);
        }

        let engine = ContentSimilarity::new(&self.config.keywords);
        let content = draft.content();
        let total: f64 = history
            .iter()
            .map(|task| engine.similarity(&content, &task.content()))
            .sum();
        let avg = total / history.len() as f64;
        Ok(clamp_score(avg * 100.0, 30.0, 100.0))
    }

    pub async fn priority_handling(&self, user: UserId, draft: &TaskDraft) -> u32 {
        let result = self.try_priority_handling(user, draft).await;
        self.absorb(
            "priority_handling",
            user,
            result,
            self.config.defaults.priority_handling_on_error,
        )
    }

    async fn try_priority_handling(&self, user: UserId, draft: &TaskDraft) -> Result<u32> {
        let same_priority = self
            .store
            .list_tasks(
                &TaskFilter::new()
                    .assigned_to(user)
                    .with_status(TaskStatus::Completed)
                    .with_priority(draft.effective_priority())
                    .limit(HISTORY_SAMPLE),
            )
            .await?;
        if same_priority.is_empty() {
            return Ok(self.config.defaults.priority_handling_no_history);
        }

        let ids: Vec<_> = same_priority.iter().map(|t| t.id).collect();
        let records = self.store.completions_for_tasks(user, &ids).await?;
        let Some(avg_efficiency) = completion::average_efficiency(&records) else {
            return Ok(self.config.defaults.priority_handling_no_history);
        };
        Ok(clamp_score(avg_efficiency * PRIORITY_EFFICIENCY_SCALE, 30.0, 100.0))
    }
}
