//! Per-user performance summary over all recorded completions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{instrument, warn};

use crate::completion::{self, CompletionRecord};
use crate::complexity::round_to;
use crate::error::Result;
use crate::store::{TaskFilter, TaskStore};
use crate::task::{Task, TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAnalytics {
    pub completed_tasks: usize,
    pub average_efficiency: f64,
    pub average_time_spent_hours: f64,
    /// 0.0 - 1.0
    pub on_time_completion_rate: f64,
}

impl Default for PerformanceAnalytics {
    fn default() -> Self {
        Self {
            completed_tasks: 0,
            average_efficiency: completion::NOMINAL_EFFICIENCY,
            average_time_spent_hours: 0.0,
            on_time_completion_rate: 0.0,
        }
    }
}

/// Undated tasks count as on time; so do records whose task has since vanished.
fn on_time(record: &CompletionRecord, due: Option<DateTime<Utc>>) -> bool {
    due.is_none_or(|due| record.completed_at <= due)
}

pub fn summarize(records: &[CompletionRecord], tasks: &[Task]) -> PerformanceAnalytics {
    if records.is_empty() {
        return PerformanceAnalytics::default();
    }
    let due_by_task: HashMap<TaskId, Option<DateTime<Utc>>> =
        tasks.iter().map(|t| (t.id, t.due_date)).collect();

    let n = records.len() as f64;
    let spent = records.iter().map(|r| r.time_spent_hours).sum::<f64>() / n;
    let punctual = records
        .iter()
        .filter(|r| on_time(r, due_by_task.get(&r.task_id).copied().flatten()))
        .count();

    PerformanceAnalytics {
        completed_tasks: records.len(),
        average_efficiency: round_to(
            completion::average_efficiency(records).unwrap_or(completion::NOMINAL_EFFICIENCY),
            2,
        ),
        average_time_spent_hours: round_to(spent, 2),
        on_time_completion_rate: round_to(punctual as f64 / n, 2),
    }
}

pub struct AnalyticsReader<'a> {
    store: &'a dyn TaskStore,
}

impl<'a> AnalyticsReader<'a> {
    pub fn new(store: &'a dyn TaskStore) -> Self {
        Self { store }
    }

    /// Never fails: a lookup error yields the neutral summary and a warning.
    #[instrument(skip(self))]
    pub async fn performance(&self, user: UserId) -> PerformanceAnalytics {
        match self.try_performance(user).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(user, error = %err, "analytics lookup failed; returning neutral summary");
                PerformanceAnalytics::default()
            }
        }
    }

    async fn try_performance(&self, user: UserId) -> Result<PerformanceAnalytics> {
        let records = self.store.recent_completions(user, usize::MAX).await?;
        if records.is_empty() {
            return Ok(PerformanceAnalytics::default());
        }
        let ids: Vec<TaskId> = records.iter().map(|r| r.task_id).collect();
        let tasks = self.store.list_tasks(&TaskFilter::new().with_ids(ids)).await?;
        Ok(summarize(&records, &tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::InMemoryStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap()
    }

    fn record(task_id: TaskId, completed_at: DateTime<Utc>, hours: f64, efficiency: f64) -> CompletionRecord {
        CompletionRecord {
            task_id,
            user_id: 1,
            completed_at,
            time_spent_hours: hours,
            efficiency,
            notes: None,
        }
    }

    #[tokio::test]
    async fn no_history_is_neutral() {
        let store = InMemoryStore::new();
        let summary = AnalyticsReader::new(&store).performance(1).await;
        assert_eq!(summary, PerformanceAnalytics::default());
        assert_eq!(summary.average_efficiency, 1.0);
    }

    #[tokio::test]
    async fn summary_counts_late_completions() {
        let store = InMemoryStore::new()
            .with_task(Task::new(1, "dated", t0()).with_due_date(t0() + Duration::hours(4)))
            .with_task(Task::new(2, "late", t0()).with_due_date(t0() + Duration::hours(1)))
            .with_task(Task::new(3, "undated", t0()))
            .with_completion(record(1, t0() + Duration::hours(4), 4.0, 1.5))
            .with_completion(record(2, t0() + Duration::hours(3), 3.0, 0.5))
            .with_completion(record(3, t0() + Duration::hours(2), 2.0, 1.0));

        let summary = AnalyticsReader::new(&store).performance(1).await;
        assert_eq!(summary.completed_tasks, 3);
        assert_eq!(summary.average_efficiency, 1.0);
        assert_eq!(summary.average_time_spent_hours, 3.0);
        assert_eq!(summary.on_time_completion_rate, 0.67);
    }

    #[test]
    fn missing_task_counts_as_on_time() {
        let summary = summarize(&[record(42, t0(), 1.0, 2.0)], &[]);
        assert_eq!(summary.on_time_completion_rate, 1.0);
        assert_eq!(summary.average_efficiency, 2.0);
    }
}
