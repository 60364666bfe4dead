//! Message bus contract
//!
//! The platform publishes outbox rows to topic streams and consumes them in
//! consumer groups. Only the contract lives here: [`EventBus`] is the trait
//! the relay publishes through and consumers subscribe through, and
//! [`MemoryBus`] is the in-process implementation used by local runs and the
//! pipeline tests. A Kafka deployment implements the same trait.
//!
//! Every payload travels inside an [`EventEnvelope`] carrying a stable
//! `event_id` (the producing outbox row id) so consumer inboxes can dedup
//! without relying on the underlying offset, which can change across
//! rebalances.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel depth per consumer group before publish backpressure kicks in.
const GROUP_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("publish to topic {topic} failed: {reason}")]
    Publish { topic: String, reason: String },
}

/// A delivered bus record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Stable id for consumer-side dedup; equals the producer's outbox row id.
    pub event_id: Uuid,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    /// Aggregate id; partition key, preserves per-entity ordering.
    pub key: String,
    pub payload: Value,
}

#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish one record. `key` is the aggregate id.
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        event_id: Uuid,
        payload: Value,
    ) -> Result<(), BusError>;

    /// Join `group` on `topic`. Each group receives every record once;
    /// records published before the subscription are not replayed.
    async fn subscribe(&self, topic: &str, group: &str) -> mpsc::Receiver<EventEnvelope>;
}

struct GroupSub {
    group: String,
    tx: mpsc::Sender<EventEnvelope>,
}

/// In-process bus with consumer-group fanout and a monotonic offset.
#[derive(Default)]
pub struct MemoryBus {
    topics: Mutex<HashMap<String, Vec<GroupSub>>>,
    offset: AtomicI64,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        event_id: Uuid,
        payload: Value,
    ) -> Result<(), BusError> {
        let envelope = EventEnvelope {
            event_id,
            topic: topic.to_string(),
            partition: 0,
            offset: self.offset.fetch_add(1, Ordering::SeqCst),
            key: key.to_string(),
            payload,
        };

        let senders: Vec<mpsc::Sender<EventEnvelope>> = {
            let mut topics = self.topics.lock().expect("bus registry poisoned");
            if let Some(subs) = topics.get_mut(topic) {
                // A group whose receiver is gone has left the bus; it must
                // not fail publishes for everyone else.
                subs.retain(|s| !s.tx.is_closed());
                subs.iter().map(|s| s.tx.clone()).collect()
            } else {
                Vec::new()
            }
        };

        for tx in senders {
            if let Err(e) = tx.send(envelope.clone()).await {
                return Err(BusError::Publish {
                    topic: topic.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str, group: &str) -> mpsc::Receiver<EventEnvelope> {
        let (tx, rx) = mpsc::channel(GROUP_CHANNEL_CAPACITY);
        let mut topics = self.topics.lock().expect("bus registry poisoned");
        let subs = topics.entry(topic.to_string()).or_default();
        // One live consumer per (topic, group): a re-subscribe replaces the
        // previous channel, mirroring a group rebalance.
        subs.retain(|s| s.group != group);
        subs.push(GroupSub {
            group: group.to_string(),
            tx,
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn publish_reaches_every_group_once() {
        let bus = MemoryBus::new();
        let mut ledger_rx = bus.subscribe("transaction.completed", "ledger").await;
        let mut audit_rx = bus.subscribe("transaction.completed", "audit").await;

        let event_id = Uuid::new_v4();
        bus.publish(
            "transaction.completed",
            "txn-1",
            event_id,
            json!({"amount": "50.0000"}),
        )
        .await
        .unwrap();

        let a = ledger_rx.recv().await.unwrap();
        let b = audit_rx.recv().await.unwrap();
        assert_eq!(a.event_id, event_id);
        assert_eq!(b.event_id, event_id);
        assert_eq!(a.key, "txn-1");
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = MemoryBus::new();
        let mut rx = bus.subscribe("wallet.balance_updated", "analytics").await;

        bus.publish("ledger.entry_created", "e1", Uuid::new_v4(), json!({}))
            .await
            .unwrap();
        bus.publish("wallet.balance_updated", "w1", Uuid::new_v4(), json!({}))
            .await
            .unwrap();

        let got = rx.recv().await.unwrap();
        assert_eq!(got.topic, "wallet.balance_updated");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn offsets_are_monotonic() {
        let bus = MemoryBus::new();
        let mut rx = bus.subscribe("t", "g").await;
        for _ in 0..3 {
            bus.publish("t", "k", Uuid::new_v4(), json!({})).await.unwrap();
        }
        let first = rx.recv().await.unwrap().offset;
        let second = rx.recv().await.unwrap().offset;
        let third = rx.recv().await.unwrap().offset;
        assert!(first < second && second < third);
    }
}
