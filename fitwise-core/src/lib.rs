//! fitwise-core: task-assignment scoring and drafting engine

pub mod advisor;
pub mod analytics;
pub mod completion;
pub mod complexity;
pub mod config;
pub mod engine;
pub mod error;
pub mod factors;
pub mod memory_store;
pub mod notify;
pub mod recorder;
pub mod scorer;
pub mod similarity;
pub mod store;
pub mod task;
pub mod time;

pub use advisor::{EstimateMethod, Recommendation, RecommendationKind, SuggestionPayload, TaskDraftAdvisor};
pub use analytics::{AnalyticsReader, PerformanceAnalytics};
pub use completion::CompletionRecord;
pub use complexity::ComplexityEstimator;
pub use config::{EngineConfig, FactorDefaults, FactorWeights, KeywordSets};
pub use engine::FitwiseEngine;
pub use error::{FitwiseError, Result};
pub use factors::{FactorCalculator, UserFactors};
pub use memory_store::{InMemoryStore, StoreSnapshot};
pub use notify::{BroadcastNotifier, CompletionNotifier, NoopNotifier};
pub use recorder::CompletionRecorder;
pub use scorer::{RecommendationTier, SuitabilityScore, SuitabilityScorer};
pub use similarity::ContentSimilarity;
pub use store::{DueWindow, TaskFilter, TaskStore};
pub use task::{Priority, Role, Task, TaskDraft, TaskId, TaskStatus, User, UserId};
