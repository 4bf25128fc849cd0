//! Completion recording: the engine's only write path.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::completion::{self, CompletionRecord};
use crate::complexity::ComplexityEstimator;
use crate::config::KeywordSets;
use crate::error::{FitwiseError, Result};
use crate::notify::CompletionNotifier;
use crate::store::TaskStore;
use crate::task::{TaskId, TaskStatus, UserId};

pub struct CompletionRecorder<'a> {
    store: &'a dyn TaskStore,
    notifier: &'a dyn CompletionNotifier,
    keywords: &'a KeywordSets,
}

impl<'a> CompletionRecorder<'a> {
    pub fn new(store: &'a dyn TaskStore, notifier: &'a dyn CompletionNotifier, keywords: &'a KeywordSets) -> Self {
        Self {
            store,
            notifier,
            keywords,
        }
    }

    /// Mark `task_id` completed by `user_id` at `now` and write its record.
    ///
    /// The early status check gives a clear error without touching the store;
    /// the store re-checks under its own guard, so a concurrent completion that
    /// slips past the first check still ends in `Conflict`.
    #[instrument(skip(self, notes))]
    pub async fn complete(
        &self,
        task_id: TaskId,
        user_id: UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CompletionRecord> {
        let task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or_else(|| FitwiseError::task_not_found(task_id))?;

        if task.status == TaskStatus::Completed {
            return Err(FitwiseError::Conflict(format!("task {task_id} is already completed")));
        }

        if self.store.get_user(user_id).await?.is_none() {
            return Err(FitwiseError::user_not_found(user_id));
        }

        let time_spent = completion::time_spent_hours(task.created_at, now);
        let expected = ComplexityEstimator::new(self.keywords).estimate_hours(
            &task.title,
            &task.description,
            task.priority,
        );
        let efficiency = completion::efficiency(expected, time_spent);

        let record = CompletionRecord {
            task_id,
            user_id,
            completed_at: now,
            time_spent_hours: time_spent,
            efficiency,
            notes: notes.filter(|n| !n.trim().is_empty()),
        };

        let updated = self.store.commit_completion(record.clone()).await?;
        info!(
            task_id,
            user_id,
            expected_hours = expected,
            time_spent_hours = time_spent,
            efficiency,
            "task completion recorded"
        );

        self.notifier.task_completed(&updated).await;
        Ok(record)
    }
}
