//! Transactional outbox
//!
//! Producers insert a `pending` row into their service's `outbox_events`
//! table inside the same database transaction as the business mutation; the
//! relay worker publishes pending rows to the bus afterwards. Publish is
//! at-least-once, so every consumer must be idempotent.

mod relay;
mod repository;

pub use relay::{OutboxRelay, RelayConfig};
pub use repository::OutboxRepository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an outbox row: `pending -> published`, or `pending` with
/// `attempts` climbing until `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Published,
    Failed,
}

/// One outbound event awaiting publication.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboxEvent {
    pub id: Uuid,
    /// Business entity the event pertains to; becomes the bus partition key.
    pub aggregate_id: String,
    pub event_type: String,
    pub topic: String,
    pub payload: Value,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// What a producer hands to [`OutboxRepository::save_event`].
#[derive(Debug, Clone)]
pub struct NewOutboxEvent {
    pub aggregate_id: String,
    pub event_type: String,
    pub topic: String,
    pub payload: Value,
}

impl NewOutboxEvent {
    pub fn new(
        aggregate_id: impl Into<String>,
        event_type: impl Into<String>,
        topic: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            event_type: event_type.into(),
            topic: topic.into(),
            payload,
        }
    }
}
