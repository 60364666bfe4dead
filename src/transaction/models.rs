use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    P2p,
    Batch,
    Scheduled,
}

/// Status moves once from `{pending, scheduled}` to a terminal
/// `{completed, failed, cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Scheduled,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed | TransactionStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: Money,
    pub currency: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub idempotency_key: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BatchTransaction {
    pub id: Uuid,
    pub from_wallet_id: String,
    pub total_amount: Money,
    pub currency: String,
    pub status: TransactionStatus,
    pub idempotency_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row content for a new `transactions` insert.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: Money,
    pub currency: String,
    pub tx_type: TransactionType,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub idempotency_key: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    #[schema(example = "50.00")]
    pub amount: String,
    pub description: Option<String>,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchTransferItem {
    pub to_wallet_id: String,
    #[schema(example = "25.00")]
    pub amount: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBatchTransactionRequest {
    pub from_wallet_id: String,
    pub transfers: Vec<BatchTransferItem>,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateScheduledTransactionRequest {
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    #[schema(example = "50.00")]
    pub amount: String,
    pub description: Option<String>,
    pub idempotency_key: String,
    pub scheduled_at: DateTime<Utc>,
}

/// Batch response: the batch row plus its item transactions.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchTransferResponse {
    pub batch: BatchTransaction,
    pub transactions: Vec<Transaction>,
}
