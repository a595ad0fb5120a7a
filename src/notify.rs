//! Topic-based change notification.
//!
//! Each topic is a tokio broadcast channel created on first subscribe.
//! Publishing is fire-and-forget: no acknowledgment, no delivery to
//! subscribers that joined later, and a topic nobody has joined yet is a
//! silent no-op. Subscribers own independent receivers, so one slow or
//! dropped viewer never blocks the rest; a receiver that falls behind the
//! channel capacity observes `Lagged` and is expected to resynchronize from
//! the store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, broadcast};

/// Topic carrying branch list changes.
pub const BRANCHES_TOPIC: &str = "branches";

const TOPIC_CAPACITY: usize = 256;

/// Message delivered to topic subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Notice>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a topic, creating its channel on first use.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<Notice> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Deliver a notice to every current subscriber of the topic.
    pub async fn publish(&self, topic: &str, notice: Notice) {
        let sender = self.topics.lock().await.get(topic).cloned();
        if let Some(tx) = sender {
            let _ = tx.send(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_notice() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe(BRANCHES_TOPIC).await;
        notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        assert_eq!(rx.recv().await.unwrap(), Notice::Updated);
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_its_own_delivery() {
        let notifier = Notifier::new();
        let mut rx1 = notifier.subscribe(BRANCHES_TOPIC).await;
        let mut rx2 = notifier.subscribe(BRANCHES_TOPIC).await;
        notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        assert_eq!(rx1.recv().await.unwrap(), Notice::Updated);
        assert_eq!(rx2.recv().await.unwrap(), Notice::Updated);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_no_op() {
        let notifier = Notifier::new();
        notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        // A later subscriber starts clean, no replay.
        let mut rx = notifier.subscribe(BRANCHES_TOPIC).await;
        notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        assert_eq!(rx.recv().await.unwrap(), Notice::Updated);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_block_others() {
        let notifier = Notifier::new();
        let rx_gone = notifier.subscribe(BRANCHES_TOPIC).await;
        let mut rx = notifier.subscribe(BRANCHES_TOPIC).await;
        drop(rx_gone);
        notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        assert_eq!(rx.recv().await.unwrap(), Notice::Updated);
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let notifier = Notifier::new();
        let mut branches = notifier.subscribe(BRANCHES_TOPIC).await;
        let mut other = notifier.subscribe("tellers").await;
        notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        assert_eq!(branches.recv().await.unwrap(), Notice::Updated);
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_slow_subscriber_observes_lag_then_recovers() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe(BRANCHES_TOPIC).await;
        for _ in 0..(TOPIC_CAPACITY + 10) {
            notifier.publish(BRANCHES_TOPIC, Notice::Updated).await;
        }
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(missed)) => assert!(missed >= 10),
            other => panic!("expected lag, got {:?}", other),
        }
        // Still attached; later notices flow again.
        assert_eq!(rx.recv().await.unwrap(), Notice::Updated);
    }

    #[test]
    fn test_notice_wire_shape() {
        let json = serde_json::to_string(&Notice::Updated).unwrap();
        assert_eq!(json, r#"{"type":"updated"}"#);
    }
}
