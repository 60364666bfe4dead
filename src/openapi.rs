//! OpenAPI document aggregation.

use utoipa::OpenApi;

use crate::analytics::models::{
    DailyMetric, HourlyMetric, MetricsSummary, UserAnalytics, UserSnapshot,
};
use crate::auth::models::{AuthResponse, AuthUser, LoginRequest, RefreshRequest, RegisterRequest};
use crate::ledger::models::{LedgerEntry, TransactionLedger, WalletLedger};
use crate::transaction::models::{
    BatchTransferItem, BatchTransferResponse, CreateBatchTransactionRequest,
    CreateScheduledTransactionRequest, CreateTransactionRequest, Transaction,
};
use crate::wallet::models::{
    CreateWalletRequest, DepositRequest, TransferRequest, Wallet, WalletEvent, WithdrawRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mercuria",
        description = "Distributed financial transaction platform",
        version = "0.1.0"
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh,
        crate::auth::handlers::me,
        crate::wallet::handlers::create_wallet,
        crate::wallet::handlers::get_wallet,
        crate::wallet::handlers::my_wallets,
        crate::wallet::handlers::deposit,
        crate::wallet::handlers::withdraw,
        crate::wallet::handlers::wallet_events,
        crate::transaction::handlers::create_transaction,
        crate::transaction::handlers::create_batch_transaction,
        crate::transaction::handlers::create_scheduled_transaction,
        crate::transaction::handlers::get_transaction,
        crate::transaction::handlers::list_transactions,
        crate::ledger::handlers::get_all_entries,
        crate::ledger::handlers::get_entry,
        crate::ledger::handlers::get_transaction_ledger,
        crate::ledger::handlers::get_wallet_ledger,
        crate::ledger::handlers::get_wallet_stats,
        crate::analytics::handlers::get_daily_metrics,
        crate::analytics::handlers::get_hourly_metrics,
        crate::analytics::handlers::get_summary,
        crate::analytics::handlers::get_my_analytics,
        crate::analytics::handlers::get_my_snapshots,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        AuthResponse,
        AuthUser,
        CreateWalletRequest,
        DepositRequest,
        WithdrawRequest,
        TransferRequest,
        Wallet,
        WalletEvent,
        CreateTransactionRequest,
        CreateBatchTransactionRequest,
        CreateScheduledTransactionRequest,
        BatchTransferItem,
        BatchTransferResponse,
        Transaction,
        LedgerEntry,
        TransactionLedger,
        WalletLedger,
        DailyMetric,
        HourlyMetric,
        MetricsSummary,
        UserAnalytics,
        UserSnapshot,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_covers_the_surface() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("openapi serializes");
        assert!(json.contains("/api/v1/transactions/batch"));
        assert!(json.contains("/api/v1/wallets/{id}/deposit"));
        assert!(json.contains("/api/v1/analytics/me/snapshots"));
        assert!(json.contains("\"/api/v1/ledger\""));
        assert!(json.contains("/api/v1/ledger/wallet/stats"));
    }
}
