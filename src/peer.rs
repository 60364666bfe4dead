//! Inter-service client
//!
//! The transaction engine resolves wallets and executes the transfer
//! primitive through the wallet service's internal HTTP surface. Transport is
//! mutually authenticated when a client identity is configured; no user token
//! is forwarded for service-to-service calls. A 10 s overall timeout applies.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PeerConfig;
use crate::gateway::error_codes;
use crate::money::Money;
use crate::wallet::WalletStatus;
use crate::wallet::models::TransferRequest;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("wallet not found")]
    NotFound,

    #[error("wallet is not active")]
    Inactive,

    /// Structured error surfaced by the wallet engine (insufficient funds,
    /// duplicate key, validation).
    #[error("wallet service error ({code}): {message}")]
    Remote { code: i32, message: String },

    /// Transport-level failure; the caller may retry with the same
    /// idempotency key.
    #[error("wallet service unreachable: {0}")]
    Unavailable(String),
}

impl PeerError {
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, PeerError::Remote { code, .. } if *code == error_codes::INSUFFICIENT_FUNDS)
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, PeerError::Remote { code, .. } if *code == error_codes::DUPLICATE_REQUEST)
    }
}

/// Wallet fields the transaction engine needs for validation.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletInfo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    pub balance: Money,
    pub status: WalletStatus,
}

#[derive(Debug, Deserialize)]
struct PeerResponse<T> {
    code: i32,
    msg: String,
    data: Option<T>,
}

pub struct WalletClient {
    base_url: String,
    http: reqwest::Client,
}

impl WalletClient {
    pub fn new(config: &PeerConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(pem_path) = &config.client_identity_pem {
            let pem = std::fs::read(pem_path)?;
            let identity = reqwest::Identity::from_pem(&pem)?;
            builder = builder.identity(identity);
            tracing::info!("mTLS client identity loaded for wallet service calls");
        }

        Ok(Self {
            base_url: config.wallet_service_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    /// Fetch a wallet from the wallet service. Fails `Inactive` for wallets
    /// that cannot participate in transfers.
    pub async fn get_wallet(&self, wallet_id: Uuid) -> Result<WalletInfo, PeerError> {
        let url = format!("{}/api/v1/internal/wallets/{wallet_id}", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PeerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PeerError::NotFound);
        }

        let body: PeerResponse<WalletInfo> = response
            .json()
            .await
            .map_err(|e| PeerError::Unavailable(format!("invalid wallet response: {e}")))?;

        if !status.is_success() || body.code != 0 {
            return Err(PeerError::Remote {
                code: body.code,
                message: body.msg,
            });
        }

        let wallet = body
            .data
            .ok_or_else(|| PeerError::Unavailable("wallet response missing data".into()))?;

        if wallet.status != WalletStatus::Active {
            return Err(PeerError::Inactive);
        }

        Ok(wallet)
    }

    /// Invoke the wallet engine's transfer primitive.
    pub async fn transfer(&self, req: &TransferRequest) -> Result<(), PeerError> {
        let url = format!("{}/api/v1/internal/wallets/transfer", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| PeerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PeerError::NotFound);
        }

        match response.json::<PeerResponse<()>>().await {
            Ok(body) => Err(PeerError::Remote {
                code: body.code,
                message: body.msg,
            }),
            Err(_) => Err(PeerError::Unavailable(format!(
                "transfer failed with status {status}"
            ))),
        }
    }
}
