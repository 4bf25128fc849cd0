//! Data-access port.
//!
//! The engine only talks to storage through [`TaskStore`]; real adapters
//! (SQL, HTTP, ...) live outside this crate. [`crate::memory_store::InMemoryStore`]
//! is the in-process implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::completion::CompletionRecord;
use crate::error::Result;
use crate::task::{Priority, Task, TaskId, TaskStatus, User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DueWindow {
    /// Strictly before the instant.
    Before(DateTime<Utc>),
    /// Inclusive at both ends.
    Between(DateTime<Utc>, DateTime<Utc>),
}

impl DueWindow {
    fn contains(&self, due: DateTime<Utc>) -> bool {
        match *self {
            DueWindow::Before(t) => due < t,
            DueWindow::Between(from, to) => due >= from && due <= to,
        }
    }
}

/// Task query. Empty fields match everything; results are newest first (id desc).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub assignee: Option<UserId>,
    pub statuses: Vec<TaskStatus>,
    pub priority: Option<Priority>,
    /// Tasks without a due date never match a window.
    pub due: Option<DueWindow>,
    /// Case-insensitive substring of title or description.
    pub text_contains: Option<String>,
    pub ids: Option<Vec<TaskId>>,
    pub limit: Option<usize>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assigned_to(mut self, user: UserId) -> Self {
        self.assignee = Some(user);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.statuses = vec![status];
        self
    }

    pub fn active(mut self) -> Self {
        self.statuses = TaskStatus::ACTIVE.to_vec();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_within(mut self, window: DueWindow) -> Self {
        self.due = Some(window);
        self
    }

    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.text_contains = Some(text.into());
        self
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = TaskId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Predicate shared by store implementations; ignores `limit`.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(user) = self.assignee {
            if !task.is_assigned_to(user) {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        if let Some(p) = self.priority {
            if task.priority != p {
                return false;
            }
        }
        if let Some(window) = &self.due {
            match task.due_date {
                Some(due) if window.contains(due) => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.text_contains {
            let needle = needle.to_lowercase();
            if !task.title.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&task.id) {
                return false;
            }
        }
        true
    }
}

/// Read/write port used by every engine component.
///
/// Each call is expected to return a consistent snapshot; consistency across
/// calls is not assumed.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<usize>;

    /// The user's most recent `limit` completions, newest first.
    async fn recent_completions(&self, user: UserId, limit: usize) -> Result<Vec<CompletionRecord>>;

    async fn completions_for_tasks(&self, user: UserId, tasks: &[TaskId]) -> Result<Vec<CompletionRecord>>;

    /// Users eligible for assignment (administrators excluded).
    async fn list_candidates(&self) -> Result<Vec<User>>;

    /// Atomically mark the record's task completed (status, actual hours,
    /// completion time) and persist the record. Either both writes land or
    /// neither does. Fails with `NotFound` for a missing task and `Conflict`
    /// if the task is already completed.
    async fn commit_completion(&self, record: CompletionRecord) -> Result<Task>;
}
