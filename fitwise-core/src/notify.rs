//! Notification seam: receives a task after it has been completed.
//!
//! Fan-out, delivery channels and retries belong to the implementation.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::task::Task;

#[async_trait]
pub trait CompletionNotifier: Send + Sync {
    async fn task_completed(&self, task: &Task);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl CompletionNotifier for NoopNotifier {
    async fn task_completed(&self, _task: &Task) {}
}

/// Publishes completed tasks on a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Task>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Task> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl CompletionNotifier for BroadcastNotifier {
    async fn task_completed(&self, task: &Task) {
        match self.tx.send(task.clone()) {
            Ok(receivers) => debug!(task_id = task.id, receivers, "completion broadcast"),
            Err(_) => debug!(task_id = task.id, "completion broadcast with no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn subscribers_receive_completed_task() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();
        let task = Task::new(3, "ship", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());

        notifier.task_completed(&task).await;
        assert_eq!(rx.recv().await.unwrap().id, 3);
    }

    #[tokio::test]
    async fn sending_without_subscribers_is_harmless() {
        let notifier = BroadcastNotifier::new(1);
        let task = Task::new(1, "x", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        notifier.task_completed(&task).await;
    }
}
