use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::ledger::EntryType;
use crate::money::Money;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyMetric {
    pub id: Uuid,
    pub metric_date: NaiveDate,
    pub total_transactions: i64,
    pub total_volume: Money,
    pub total_fees: Money,
    pub unique_users: i64,
    pub successful_transactions: i64,
    pub failed_transactions: i64,
    pub avg_transaction_value: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct HourlyMetric {
    pub id: Uuid,
    pub metric_hour: DateTime<Utc>,
    pub total_transactions: i64,
    pub total_volume: Money,
    pub total_fees: Money,
    pub unique_users: i64,
    pub successful_transactions: i64,
    pub failed_transactions: i64,
    pub avg_transaction_value: Money,
    pub max_transaction_value: Money,
    pub min_transaction_value: Money,
    #[schema(value_type = String)]
    pub avg_processing_time_ms: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user per-day counters. User ids are the wallet ids carried by ledger
/// events; the wallet service owns the wallet-to-user mapping.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserSnapshot {
    pub id: Uuid,
    pub user_id: String,
    pub snapshot_date: NaiveDate,
    pub total_sent: Money,
    pub total_received: Money,
    pub transaction_count: i64,
    pub sent_count: i64,
    pub received_count: i64,
    pub total_fees_paid: Money,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `ledger.entry_created` payload as consumed from the bus.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntryEvent {
    pub entry_id: Uuid,
    pub transaction_id: String,
    pub wallet_id: String,
    pub entry_type: EntryType,
    pub amount: Money,
    #[serde(default)]
    pub currency: Option<String>,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl LedgerEntryEvent {
    /// Sender and receiver wallet for this entry. The entry names one side;
    /// the other side is carried in the metadata cross-reference.
    pub fn participants(&self) -> (Option<String>, Option<String>) {
        match self.entry_type {
            EntryType::Debit => {
                let receiver = self.metadata["to_wallet_id"].as_str().map(String::from);
                (Some(self.wallet_id.clone()), receiver)
            }
            EntryType::Credit => {
                let sender = self.metadata["from_wallet_id"].as_str().map(String::from);
                (sender, Some(self.wallet_id.clone()))
            }
        }
    }
}

// ============================================================================
// Read-side responses
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsSummary {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_transactions: i64,
    pub total_volume: Money,
    pub total_fees: Money,
    pub successful_transactions: i64,
    pub failed_transactions: i64,
    pub avg_transaction_value: Money,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct UserAnalytics {
    pub user_id: String,
    pub total_sent: Money,
    pub total_received: Money,
    pub transaction_count: i64,
    pub sent_count: i64,
    pub received_count: i64,
    pub total_fees_paid: Money,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(entry_type: EntryType, metadata: serde_json::Value) -> LedgerEntryEvent {
        LedgerEntryEvent {
            entry_id: Uuid::new_v4(),
            transaction_id: "txn-1".to_string(),
            wallet_id: "w1".to_string(),
            entry_type,
            amount: Money::parse("50.00").unwrap(),
            currency: Some("USD".to_string()),
            balance: Money::parse("450.0000").unwrap(),
            created_at: Utc::now(),
            metadata,
        }
    }

    #[test]
    fn debit_names_sender_and_cross_references_receiver() {
        let e = event(EntryType::Debit, json!({"to_wallet_id": "w2"}));
        let (sender, receiver) = e.participants();
        assert_eq!(sender.as_deref(), Some("w1"));
        assert_eq!(receiver.as_deref(), Some("w2"));
    }

    #[test]
    fn credit_names_receiver_and_cross_references_sender() {
        let e = event(EntryType::Credit, json!({"from_wallet_id": "w0"}));
        let (sender, receiver) = e.participants();
        assert_eq!(sender.as_deref(), Some("w0"));
        assert_eq!(receiver.as_deref(), Some("w1"));
    }

    #[test]
    fn missing_metadata_leaves_side_unknown() {
        let e = event(EntryType::Debit, json!({}));
        let (sender, receiver) = e.participants();
        assert_eq!(sender.as_deref(), Some("w1"));
        assert!(receiver.is_none());
    }
}
