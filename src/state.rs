//! Shared application state.
//!
//! Each service process owns a bundle of handles (database, KV, bus,
//! services) constructed at startup and threaded through the axum routers.
//! No ambient global state: everything a handler touches hangs off this.

use std::sync::Arc;

use crate::analytics::AnalyticsService;
use crate::auth::AuthService;
use crate::bus::EventBus;
use crate::config::{AppConfig, ServiceKind};
use crate::db::Database;
use crate::gateway::ApiError;
use crate::kv::KvStore;
use crate::ledger::LedgerService;
use crate::transaction::TransactionService;
use crate::wallet::WalletService;

pub struct AppState {
    pub config: AppConfig,
    pub kind: ServiceKind,
    pub db: Database,
    pub kv: KvStore,
    pub bus: Arc<dyn EventBus>,
    pub auth: Option<AuthService>,
    pub wallets: Option<WalletService>,
    pub transactions: Option<TransactionService>,
    pub ledger: Option<LedgerService>,
    pub analytics: Option<AnalyticsService>,
}

impl AppState {
    pub fn auth_service(&self) -> Result<&AuthService, ApiError> {
        self.auth
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("auth service not available"))
    }

    pub fn wallet_service(&self) -> Result<&WalletService, ApiError> {
        self.wallets
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("wallet service not available"))
    }

    pub fn transaction_service(&self) -> Result<&TransactionService, ApiError> {
        self.transactions
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("transaction service not available"))
    }

    pub fn ledger_service(&self) -> Result<&LedgerService, ApiError> {
        self.ledger
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("ledger service not available"))
    }

    pub fn analytics_service(&self) -> Result<&AnalyticsService, ApiError> {
        self.analytics
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("analytics service not available"))
    }
}
