//! Heuristic suggestions for a task being drafted.
//!
//! Four independent heuristics, emitted in a fixed order (priority, time
//! estimate, user assignment, due date) and only when they have a signal.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::completion;
use crate::complexity::{ComplexityEstimator, round_to};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::store::{TaskFilter, TaskStore};
use crate::task::{Priority, TaskDraft, UserId};

const SIMILAR_TASK_LIMIT: usize = 10;
const DEFAULT_SIMILAR_HOURS: f64 = 4.0;
const CONTENT_ESTIMATE_CONFIDENCE: f64 = 0.5;

const OVERLOAD_ACTIVE_TASKS: usize = 5;
const EFFICIENT_THRESHOLD: f64 = 1.2;
const EFFICIENCY_SAMPLE: usize = 10;
const OVERLOAD_CONFIDENCE: f64 = 0.8;
const EFFICIENT_CONFIDENCE: f64 = 0.7;

const DUE_DATE_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    Priority,
    TimeEstimate,
    UserAssignment,
    DueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimateMethod {
    SimilarTasks,
    ContentAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SuggestionPayload {
    Priority {
        suggested: Priority,
        keywords: Vec<String>,
    },
    TimeEstimate {
        hours: f64,
        based_on_tasks: usize,
        method: EstimateMethod,
    },
    OverloadedUsers {
        user_ids: Vec<UserId>,
    },
    EfficientUsers {
        user_ids: Vec<UserId>,
        average_efficiency: f64,
    },
    DueDate {
        date: NaiveDate,
        days_from_now: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    #[serde(default)]
    pub payload: Option<SuggestionPayload>,
}

/// Days from now to suggest as a due date.
pub fn due_in_days(priority: Option<Priority>) -> i64 {
    match priority {
        Some(Priority::High) => 2,
        Some(Priority::Medium) => 5,
        Some(Priority::Low) | None => 10,
    }
}

#[derive(Debug, Clone, Copy)]
struct AssigneeSnapshot {
    user: UserId,
    active_tasks: usize,
    avg_efficiency: f64,
}

pub struct TaskDraftAdvisor<'a> {
    store: &'a dyn TaskStore,
    config: &'a EngineConfig,
}

impl<'a> TaskDraftAdvisor<'a> {
    pub fn new(store: &'a dyn TaskStore, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Fails only on an invalid draft; lookups that fail degrade per heuristic.
    #[instrument(skip_all, fields(title = %draft.title))]
    pub async fn advise(&self, draft: &TaskDraft, now: DateTime<Utc>) -> Result<Vec<Recommendation>> {
        draft.validate()?;

        let mut out = Vec::new();
        out.extend(self.suggest_priority(draft));
        out.push(self.suggest_time_estimate(draft).await);
        if !draft.assigned_user_ids.is_empty() {
            out.extend(self.review_assignees(&draft.assigned_user_ids).await);
        }
        out.push(self.suggest_due_date(draft.priority, now));
        Ok(out)
    }

    pub fn suggest_priority(&self, draft: &TaskDraft) -> Option<Recommendation> {
        let content = draft.content().to_lowercase();
        let matches = |list: &[String]| -> Vec<String> {
            list.iter().filter(|k| content.contains(k.as_str())).cloned().collect()
        };

        let high = matches(&self.config.keywords.high_urgency);
        if !high.is_empty() {
            return Some(priority_recommendation(Priority::High, high, 0.5, 0.9));
        }

        let medium = matches(&self.config.keywords.medium_urgency);
        if !medium.is_empty() {
            return Some(priority_recommendation(Priority::Medium, medium, 0.4, 0.8));
        }
        None
    }

    pub async fn suggest_time_estimate(&self, draft: &TaskDraft) -> Recommendation {
        if let Some(term) = draft.title.split_whitespace().next() {
            let filter = TaskFilter::new().containing(term).limit(SIMILAR_TASK_LIMIT);
            match self.store.list_tasks(&filter).await {
                Ok(similar) if !similar.is_empty() => {
                    // Matches only raise confidence; the suggested effort stays fixed.
                    let hours = DEFAULT_SIMILAR_HOURS;
                    let n = similar.len();
                    return Recommendation {
                        kind: RecommendationKind::TimeEstimate,
                        message: format!("Based on {n} similar tasks, estimated time: {hours} hours"),
                        confidence: (0.3 + n as f64 * 0.05).min(0.8),
                        payload: Some(SuggestionPayload::TimeEstimate {
                            hours,
                            based_on_tasks: n,
                            method: EstimateMethod::SimilarTasks,
                        }),
                    };
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, term, "similar task lookup failed; estimating from content"),
            }
        }

        let hours = ComplexityEstimator::new(&self.config.keywords).estimate_hours(
            &draft.title,
            &draft.description,
            draft.effective_priority(),
        );
        Recommendation {
            kind: RecommendationKind::TimeEstimate,
            message: format!("Estimated time based on content analysis: {hours} hours"),
            confidence: CONTENT_ESTIMATE_CONFIDENCE,
            payload: Some(SuggestionPayload::TimeEstimate {
                hours,
                based_on_tasks: 0,
                method: EstimateMethod::ContentAnalysis,
            }),
        }
    }

    /// An overload warning wins over an efficiency note.
    pub async fn review_assignees(&self, users: &[UserId]) -> Option<Recommendation> {
        let mut unique: Vec<UserId> = Vec::with_capacity(users.len());
        for user in users {
            if !unique.contains(user) {
                unique.push(*user);
            }
        }
        let snapshots = join_all(unique.iter().map(|u| self.assignee_snapshot(*u))).await;

        let overloaded: Vec<UserId> = snapshots
            .iter()
            .filter(|s| s.active_tasks > OVERLOAD_ACTIVE_TASKS)
            .map(|s| s.user)
            .collect();
        if !overloaded.is_empty() {
            return Some(Recommendation {
                kind: RecommendationKind::UserAssignment,
                message: format!(
                    "Warning: Some assigned users have high workload (>{OVERLOAD_ACTIVE_TASKS} active tasks)"
                ),
                confidence: OVERLOAD_CONFIDENCE,
                payload: Some(SuggestionPayload::OverloadedUsers { user_ids: overloaded }),
            });
        }

        let efficient: Vec<&AssigneeSnapshot> = snapshots
            .iter()
            .filter(|s| s.avg_efficiency > EFFICIENT_THRESHOLD)
            .collect();
        if efficient.is_empty() {
            return None;
        }
        let average = efficient.iter().map(|s| s.avg_efficiency).sum::<f64>() / efficient.len() as f64;
        Some(Recommendation {
            kind: RecommendationKind::UserAssignment,
            message: format!("Assigned users have good efficiency ratings (avg: {average:.1}x)"),
            confidence: EFFICIENT_CONFIDENCE,
            payload: Some(SuggestionPayload::EfficientUsers {
                user_ids: efficient.iter().map(|s| s.user).collect(),
                average_efficiency: round_to(average, 2),
            }),
        })
    }

    async fn assignee_snapshot(&self, user: UserId) -> AssigneeSnapshot {
        let active_filter = TaskFilter::new().assigned_to(user).active();
        let (active, recent) = futures::join!(
            self.store.count_tasks(&active_filter),
            self.store.recent_completions(user, EFFICIENCY_SAMPLE),
        );

        let active_tasks = active.unwrap_or_else(|err| {
            warn!(user, error = %err, "active task count failed; assuming none");
            0
        });
        let avg_efficiency = match recent {
            Ok(records) => completion::average_efficiency(&records).unwrap_or(completion::NOMINAL_EFFICIENCY),
            Err(err) => {
                warn!(user, error = %err, "completion lookup failed; assuming nominal efficiency");
                completion::NOMINAL_EFFICIENCY
            }
        };
        AssigneeSnapshot {
            user,
            active_tasks,
            avg_efficiency,
        }
    }

    pub fn suggest_due_date(&self, priority: Option<Priority>, now: DateTime<Utc>) -> Recommendation {
        let days = due_in_days(priority);
        let date = (now + Duration::days(days)).date_naive();
        Recommendation {
            kind: RecommendationKind::DueDate,
            message: format!("Recommended due date: {date} ({days} days from now)"),
            confidence: DUE_DATE_CONFIDENCE,
            payload: Some(SuggestionPayload::DueDate {
                date,
                days_from_now: days,
            }),
        }
    }
}

fn priority_recommendation(level: Priority, keywords: Vec<String>, base: f64, cap: f64) -> Recommendation {
    let confidence = (base + 0.1 * keywords.len() as f64).min(cap);
    Recommendation {
        kind: RecommendationKind::Priority,
        message: format!(
            "Consider setting priority to {}. Detected keywords: {}",
            level.as_str().to_uppercase(),
            keywords.join(", ")
        ),
        confidence,
        payload: Some(SuggestionPayload::Priority {
            suggested: level,
            keywords,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionRecord;
    use crate::memory_store::InMemoryStore;
    use crate::task::{Task, TaskStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 5, 15, 0, 0).unwrap()
    }

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn two_high_keywords_give_point_seven() {
        let store = InMemoryStore::new();
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let rec = advisor
            .suggest_priority(&TaskDraft::new("Urgent outage", "Critical path is down"))
            .unwrap();
        assert!((rec.confidence - 0.7).abs() < 1e-9);
        match rec.payload {
            Some(SuggestionPayload::Priority { suggested, keywords }) => {
                assert_eq!(suggested, Priority::High);
                assert_eq!(keywords, vec!["urgent", "critical"]);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn medium_keywords_only_when_no_high() {
        let store = InMemoryStore::new();
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let rec = advisor
            .suggest_priority(&TaskDraft::new("Review feature", "Weekly meeting notes"))
            .unwrap();
        assert!(rec.message.contains("MEDIUM"));
        // review, feature, meeting
        assert!((rec.confidence - 0.7).abs() < 1e-9);

        let many = advisor
            .suggest_priority(&TaskDraft::new(
                "Important feature update",
                "improvement to optimize performance, review in meeting",
            ))
            .unwrap();
        assert!((many.confidence - 0.8).abs() < 1e-9);

        assert!(advisor.suggest_priority(&TaskDraft::new("Water plants", "Office ficus")).is_none());
    }

    #[tokio::test]
    async fn similar_history_suggests_fixed_four_hours() {
        let store = InMemoryStore::new()
            .with_task(Task::new(1, "Invoice export", now()).with_actual_hours(12.0).with_status(TaskStatus::Completed))
            .with_task(Task::new(2, "Monthly INVOICE run", now()).with_actual_hours(14.0).with_status(TaskStatus::Completed))
            .with_task(Task::new(3, "Unrelated", now()).with_description("invoice archive"));
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let rec = advisor
            .suggest_time_estimate(&TaskDraft::new("Invoice reminders", "Send reminders"))
            .await;
        assert!((rec.confidence - 0.45).abs() < 1e-9);
        assert_eq!(
            rec.payload,
            Some(SuggestionPayload::TimeEstimate {
                hours: 4.0,
                based_on_tasks: 3,
                method: EstimateMethod::SimilarTasks,
            })
        );
    }

    #[tokio::test]
    async fn time_estimate_defaults_to_four_hours_without_actuals() {
        let store = InMemoryStore::new().with_task(Task::new(1, "Onboarding checklist", now()));
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let rec = advisor
            .suggest_time_estimate(&TaskDraft::new("Onboarding for Sam", "Laptop and accounts"))
            .await;
        assert!(rec.message.contains("4 hours"));
    }

    #[tokio::test]
    async fn time_estimate_falls_back_to_content() {
        let store = InMemoryStore::new();
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let draft = TaskDraft::new("Database api", "wire it up").with_priority(Priority::Medium);
        let rec = advisor.suggest_time_estimate(&draft).await;
        assert_eq!(rec.confidence, 0.5);
        assert_eq!(
            rec.payload,
            Some(SuggestionPayload::TimeEstimate {
                hours: 3.0,
                based_on_tasks: 0,
                method: EstimateMethod::ContentAnalysis,
            })
        );
    }

    #[tokio::test]
    async fn overload_warning_beats_efficiency_note() {
        let mut store = InMemoryStore::new();
        for id in 1..=6 {
            store = store.with_task(Task::new(id, "open", now()).assigned_to(1));
        }
        store = store.with_completion(CompletionRecord {
            task_id: 99,
            user_id: 2,
            completed_at: now(),
            time_spent_hours: 1.0,
            efficiency: 2.0,
            notes: None,
        });
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let both = advisor.review_assignees(&[1, 2]).await.unwrap();
        assert_eq!(both.confidence, 0.8);
        assert_eq!(both.payload, Some(SuggestionPayload::OverloadedUsers { user_ids: vec![1] }));

        let efficient = advisor.review_assignees(&[2]).await.unwrap();
        assert_eq!(efficient.confidence, 0.7);
        assert!(efficient.message.contains("2.0x"));

        assert!(advisor.review_assignees(&[3]).await.is_none());
    }

    #[tokio::test]
    async fn repeated_assignees_are_reported_once() {
        let mut store = InMemoryStore::new();
        for id in 1..=6 {
            store = store.with_task(Task::new(id, "open", now()).assigned_to(1));
        }
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let rec = advisor.review_assignees(&[1, 3, 1]).await.unwrap();
        assert_eq!(rec.payload, Some(SuggestionPayload::OverloadedUsers { user_ids: vec![1] }));
    }

    #[test]
    fn due_date_tracks_priority() {
        let store = InMemoryStore::new();
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let high = advisor.suggest_due_date(Some(Priority::High), now());
        assert_eq!(
            high.payload,
            Some(SuggestionPayload::DueDate {
                date: NaiveDate::from_ymd_opt(2026, 10, 7).unwrap(),
                days_from_now: 2,
            })
        );
        assert_eq!(due_in_days(Some(Priority::Medium)), 5);
        assert_eq!(due_in_days(None), 10);
        assert_eq!(high.confidence, 0.6);
    }

    #[tokio::test]
    async fn advise_orders_heuristics_and_validates() {
        let store = InMemoryStore::new().with_task(Task::new(1, "open", now()).assigned_to(4));
        let config = EngineConfig::default();
        let advisor = TaskDraftAdvisor::new(&store, &config);

        let draft = TaskDraft::new("Urgent: customer crash", "Fix asap")
            .with_priority(Priority::High)
            .with_assignees([4]);
        let recs = advisor.advise(&draft, now()).await.unwrap();
        // assignee 4 has one task and no history: no assignment signal
        assert_eq!(
            kinds(&recs),
            vec![RecommendationKind::Priority, RecommendationKind::TimeEstimate, RecommendationKind::DueDate]
        );

        let err = advisor.advise(&TaskDraft::new("", "body"), now()).await.unwrap_err();
        assert_eq!(err.code(), "validation_failed");
    }
}
