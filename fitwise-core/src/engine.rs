//! Caller-facing facade: scoring, drafting, completion and analytics.
//!
//! Every operation has a `*_at` form taking an explicit `now` so callers (and
//! tests) control the clock; the plain forms use `Utc::now()`.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::advisor::{Recommendation, TaskDraftAdvisor};
use crate::analytics::{AnalyticsReader, PerformanceAnalytics};
use crate::completion::CompletionRecord;
use crate::config::EngineConfig;
use crate::error::{FitwiseError, Result};
use crate::notify::{CompletionNotifier, NoopNotifier};
use crate::recorder::CompletionRecorder;
use crate::scorer::{SuitabilityScore, SuitabilityScorer};
use crate::store::TaskStore;
use crate::task::{TaskDraft, TaskId, UserId};

#[derive(Clone)]
pub struct FitwiseEngine {
    store: Arc<dyn TaskStore>,
    notifier: Arc<dyn CompletionNotifier>,
    config: EngineConfig,
}

impl FitwiseEngine {
    /// Fails with `Config` if the weights or keyword lists are invalid.
    pub fn new(store: Arc<dyn TaskStore>, config: EngineConfig) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        Ok(Self {
            store,
            notifier: Arc::new(NoopNotifier),
            config,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn CompletionNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    pub async fn score_candidates(&self, draft: &TaskDraft) -> Result<Vec<SuitabilityScore>> {
        self.score_candidates_at(draft, Utc::now()).await
    }

    /// Rank every non-admin user for `draft`, best first.
    ///
    /// Factor lookups degrade to defaults; only a failure to list the
    /// candidates themselves is returned as an error.
    #[instrument(skip_all, fields(title = %draft.title))]
    pub async fn score_candidates_at(&self, draft: &TaskDraft, now: DateTime<Utc>) -> Result<Vec<SuitabilityScore>> {
        draft.validate()?;
        let candidates = self.store.list_candidates().await?;
        let ranked = SuitabilityScorer::new(self.store.as_ref(), &self.config)
            .rank(&candidates, draft, now)
            .await;
        info!(candidates = ranked.len(), top = ?ranked.first().map(|s| s.user_id), "candidates ranked");
        Ok(ranked)
    }

    pub async fn score_user(&self, user_id: UserId, draft: &TaskDraft) -> Result<SuitabilityScore> {
        self.score_user_at(user_id, draft, Utc::now()).await
    }

    #[instrument(skip(self, draft))]
    pub async fn score_user_at(&self, user_id: UserId, draft: &TaskDraft, now: DateTime<Utc>) -> Result<SuitabilityScore> {
        draft.validate()?;
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| FitwiseError::user_not_found(user_id))?;
        Ok(SuitabilityScorer::new(self.store.as_ref(), &self.config)
            .score_user(&user, draft, now)
            .await)
    }

    pub async fn draft_suggestions(&self, draft: &TaskDraft) -> Result<Vec<Recommendation>> {
        self.draft_suggestions_at(draft, Utc::now()).await
    }

    pub async fn draft_suggestions_at(&self, draft: &TaskDraft, now: DateTime<Utc>) -> Result<Vec<Recommendation>> {
        TaskDraftAdvisor::new(self.store.as_ref(), &self.config)
            .advise(draft, now)
            .await
    }

    pub async fn complete_task(&self, task_id: TaskId, user_id: UserId, notes: Option<String>) -> Result<CompletionRecord> {
        self.complete_task_at(task_id, user_id, notes, Utc::now()).await
    }

    pub async fn complete_task_at(
        &self,
        task_id: TaskId,
        user_id: UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CompletionRecord> {
        CompletionRecorder::new(self.store.as_ref(), self.notifier.as_ref(), &self.config.keywords)
            .complete(task_id, user_id, notes, now)
            .await
    }

    pub async fn performance_analytics(&self, user_id: UserId) -> PerformanceAnalytics {
        AnalyticsReader::new(self.store.as_ref()).performance(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactorWeights;
    use crate::memory_store::InMemoryStore;
    use crate::task::User;

    #[test]
    fn invalid_weights_are_rejected_up_front() {
        let config = EngineConfig {
            weights: FactorWeights {
                performance: 0.9,
                ..FactorWeights::default()
            },
            ..EngineConfig::default()
        };
        let err = FitwiseEngine::new(Arc::new(InMemoryStore::new()), config)
            .err()
            .unwrap();
        assert_eq!(err.code(), "config");
    }

    #[tokio::test]
    async fn configured_keywords_match_regardless_of_case() {
        let mut config = EngineConfig::default();
        config.keywords.high_urgency = vec!["Blocker".to_string()];
        let engine = FitwiseEngine::new(Arc::new(InMemoryStore::new()), config).unwrap();

        let recs = engine
            .draft_suggestions(&TaskDraft::new("Release blocker", "Signing fails"))
            .await
            .unwrap();
        assert!(recs[0].message.contains("HIGH"));
        assert!(recs[0].message.contains("blocker"));
    }

    #[test]
    fn blank_keyword_fails_engine_construction() {
        let mut config = EngineConfig::default();
        config.keywords.high_urgency.push(String::new());
        let err = FitwiseEngine::new(Arc::new(InMemoryStore::new()), config).err().unwrap();
        assert_eq!(err.code(), "config");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = InMemoryStore::new().with_user(User::new(1, "ana"));
        let engine = FitwiseEngine::new(Arc::new(store), EngineConfig::default()).unwrap();
        let draft = TaskDraft::new("Write docs", "User guide");

        assert_eq!(engine.score_user(1, &draft).await.unwrap().score, 75);
        let err = engine.score_user(2, &draft).await.unwrap_err();
        assert_eq!(err, FitwiseError::user_not_found(2));
    }

    #[tokio::test]
    async fn scoring_validates_before_touching_the_store() {
        let engine = FitwiseEngine::new(Arc::new(InMemoryStore::new()), EngineConfig::default()).unwrap();
        let err = engine
            .score_candidates(&TaskDraft::new("Title only", "  "))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_failed");
    }
}
