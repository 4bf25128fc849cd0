//! Task and user model read by the scoring engine.
//!
//! The engine never owns these records: storage lives behind
//! [`crate::store::TaskStore`]. The only field writes happen on completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TaskId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Incomplete,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Incomplete and in-progress tasks count toward a user's workload.
    pub fn is_active(self) -> bool {
        !matches!(self, TaskStatus::Completed)
    }

    pub const ACTIVE: [TaskStatus; 2] = [TaskStatus::Incomplete, TaskStatus::InProgress];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{other}' (expected low, medium or high)")),
        }
    }
}

/// A stored work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,

    pub status: TaskStatus,
    pub priority: Priority,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    /// Hours.
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    /// Hours, written on completion.
    #[serde(default)]
    pub actual_hours: Option<f64>,

    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub assignees: Vec<UserId>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Incomplete,
            priority: Priority::Low,
            due_date: None,
            estimated_hours: None,
            actual_hours: None,
            created_at,
            started_at: None,
            completed_at: None,
            assignees: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_actual_hours(mut self, hours: f64) -> Self {
        self.actual_hours = Some(hours);
        self
    }

    pub fn assigned_to(mut self, user: UserId) -> Self {
        if !self.assignees.contains(&user) {
            self.assignees.push(user);
        }
        self
    }

    /// Title and description joined the way every text heuristic reads them.
    pub fn content(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    pub fn is_assigned_to(&self, user: UserId) -> bool {
        self.assignees.contains(&user)
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.due_date.is_some_and(|due| due < now)
    }
}

/// Prospective task as submitted for scoring or drafting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_user_ids: Vec<UserId>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_assignees(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.assigned_user_ids = users.into_iter().collect();
        self
    }

    pub fn content(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Unspecified priority is treated as low everywhere a level is required.
    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or(Priority::Low)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::FitwiseError::validation("title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(crate::FitwiseError::validation("description is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: String::new(),
            role: Role::User,
        }
    }

    pub fn admin(id: UserId, name: impl Into<String>) -> Self {
        Self {
            role: Role::Admin,
            ..Self::new(id, name)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
