use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

/// Append-only double-entry row. `balance` is the running balance of the
/// wallet after this entry.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub transaction_id: String,
    pub wallet_id: String,
    pub entry_type: EntryType,
    pub amount: Money,
    pub currency: String,
    pub balance: Money,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Write request for one transaction's entry pair.
#[derive(Debug, Clone)]
pub struct RecordEntriesRequest {
    pub transaction_id: String,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: Money,
    pub currency: String,
    pub description: String,
}

/// Per-transaction ledger view with debit/credit totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionLedger {
    pub transaction_id: String,
    pub entries: Vec<LedgerEntry>,
    pub total_debits: Money,
    pub total_credits: Money,
    pub created_at: DateTime<Utc>,
}

/// Per-wallet ledger view with the current running balance.
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletLedger {
    pub wallet_id: String,
    pub entries: Vec<LedgerEntry>,
    pub balance: Money,
}

/// Per-wallet aggregate counters.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LedgerStats {
    pub entry_count: i64,
    pub debit_count: i64,
    pub credit_count: i64,
    pub total_debits: Money,
    pub total_credits: Money,
}

/// `transaction.completed` payload as consumed from the bus.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionCompletedEvent {
    pub transaction_id: String,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount: Money,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, rename = "type")]
    pub tx_type: Option<String>,
}

/// `ledger.entry_created` payload as published to the bus.
#[derive(Debug, Serialize)]
pub struct LedgerEntryCreatedEvent<'a> {
    pub entry_id: Uuid,
    pub transaction_id: &'a str,
    pub wallet_id: &'a str,
    pub entry_type: EntryType,
    pub amount: Money,
    pub currency: &'a str,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub metadata: &'a Value,
}
