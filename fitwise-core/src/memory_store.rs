//! Snapshot-backed in-memory [`TaskStore`].
//!
//! Keeps canonical copies in ordered maps so every query is deterministic.
//! All state sits behind one `RwLock`; the completion commit does its
//! check-and-write under a single write guard, which serializes concurrent
//! completions of the same task.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::completion::CompletionRecord;
use crate::error::{FitwiseError, Result};
use crate::store::{TaskFilter, TaskStore};
use crate::task::{Task, TaskId, TaskStatus, User, UserId};

/// Serializable content of a store (the CLI's data file format).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    tasks: BTreeMap<TaskId, Task>,
    completions: Vec<CompletionRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let state = State {
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            tasks: snapshot.tasks.into_iter().map(|t| (t.id, t)).collect(),
            completions: snapshot.completions,
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let state = self.read()?;
        Ok(StoreSnapshot {
            users: state.users.values().cloned().collect(),
            tasks: state.tasks.values().cloned().collect(),
            completions: state.completions.clone(),
        })
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.state_mut().users.insert(user.id, user);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.state_mut().tasks.insert(task.id, task);
        self
    }

    pub fn with_completion(mut self, record: CompletionRecord) -> Self {
        self.state_mut().completions.push(record);
        self
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| FitwiseError::data_access("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| FitwiseError::data_access("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn get_task(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let state = self.read()?;
        let matching = state.tasks.values().rev().filter(|t| filter.matches(t)).cloned();
        Ok(match filter.limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        })
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> Result<usize> {
        let state = self.read()?;
        let count = state.tasks.values().filter(|t| filter.matches(t)).count();
        Ok(filter.limit.map_or(count, |n| count.min(n)))
    }

    async fn recent_completions(&self, user: UserId, limit: usize) -> Result<Vec<CompletionRecord>> {
        let state = self.read()?;
        let mut records: Vec<CompletionRecord> = state
            .completions
            .iter()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn completions_for_tasks(&self, user: UserId, tasks: &[TaskId]) -> Result<Vec<CompletionRecord>> {
        let state = self.read()?;
        Ok(state
            .completions
            .iter()
            .filter(|r| r.user_id == user && tasks.contains(&r.task_id))
            .cloned()
            .collect())
    }

    async fn list_candidates(&self) -> Result<Vec<User>> {
        let state = self.read()?;
        Ok(state.users.values().filter(|u| !u.is_admin()).cloned().collect())
    }

    async fn commit_completion(&self, record: CompletionRecord) -> Result<Task> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&record.task_id)
            .ok_or_else(|| FitwiseError::task_not_found(record.task_id))?;

        if task.status == TaskStatus::Completed {
            return Err(FitwiseError::Conflict(format!(
                "task {} is already completed",
                record.task_id
            )));
        }

        task.status = TaskStatus::Completed;
        task.actual_hours = Some(record.time_spent_hours);
        task.completed_at = Some(record.completed_at);
        let updated = task.clone();

        state.completions.push(record);
        Ok(updated)
    }
}
