use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money::Money;

/// Wallet lifecycle. Only `active` wallets may participate in transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Active,
    Locked,
    Inactive,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    /// ISO-4217 three-letter code
    pub currency: String,
    pub balance: Money,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Journal entry types. `balance_after = balance_before ± amount` per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalletEventType {
    Created,
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
    Locked,
    Unlocked,
}

impl WalletEventType {
    /// Whether this event adds to the balance.
    pub fn is_inflow(&self) -> bool {
        matches!(self, WalletEventType::Deposit | WalletEventType::TransferIn)
    }
}

/// Append-only journal row; never mutated.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WalletEvent {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub event_type: WalletEventType,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    #[schema(value_type = Object)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Journal row before insertion.
#[derive(Debug, Clone)]
pub struct NewWalletEvent {
    pub wallet_id: Uuid,
    pub event_type: WalletEventType,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    pub metadata: Value,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    #[schema(example = "USD")]
    pub currency: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    /// String to avoid float precision issues in JSON
    #[schema(example = "50.00")]
    pub amount: String,
    pub description: Option<String>,
    pub idempotency_key: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    #[schema(example = "50.00")]
    pub amount: String,
    pub description: Option<String>,
    pub idempotency_key: String,
}

/// Internal transfer primitive request (service-to-service surface).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    #[schema(example = "50.00")]
    pub amount: String,
    pub idempotency_key: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Outbound event payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct WalletCreatedEvent {
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BalanceUpdatedEvent {
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub event_type: WalletEventType,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    pub timestamp: DateTime<Utc>,
}
