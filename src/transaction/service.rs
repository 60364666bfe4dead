//! Transaction engine service layer.
//!
//! The three state machines (P2P, batch, scheduled) share one pattern:
//! validation, idempotency admission, remote execution through the wallet
//! engine, then the local record plus its outbox event in one database
//! transaction. The KV idempotency key is set only after commit; the unique
//! constraint on `idempotency_key` turns a crash in that window into a clean
//! `Duplicate` on retry instead of a double execution.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::{Database, is_unique_violation};
use crate::kv::KvStore;
use crate::money::Money;
use crate::outbox::{NewOutboxEvent, OutboxRepository};
use crate::peer::{WalletClient, WalletInfo};
use crate::wallet::models::TransferRequest;

use super::error::TransactionError;
use super::models::{
    BatchTransferResponse, CreateBatchTransactionRequest, CreateScheduledTransactionRequest,
    CreateTransactionRequest, NewTransaction, Transaction, TransactionStatus, TransactionType,
};
use super::repository::TransactionRepository;
use super::validation::{
    validate_create_batch, validate_create_scheduled, validate_create_transaction,
};

pub const TOPIC_TRANSACTION_COMPLETED: &str = "transaction.completed";
pub const TOPIC_BATCH_COMPLETED: &str = "batch.completed";

#[derive(Clone)]
pub struct TransactionService {
    repo: TransactionRepository,
    outbox: OutboxRepository,
    kv: KvStore,
    db: Database,
    wallets: Arc<WalletClient>,
}

impl TransactionService {
    pub fn new(
        repo: TransactionRepository,
        outbox: OutboxRepository,
        kv: KvStore,
        db: Database,
        wallets: Arc<WalletClient>,
    ) -> Self {
        Self {
            repo,
            outbox,
            kv,
            db,
            wallets,
        }
    }

    /// P2P transfer: validate → admit → resolve wallets → execute remotely →
    /// record completed row + outbox event in one transaction.
    pub async fn create_p2p_transfer(
        &self,
        req: &CreateTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let amount = validate_create_transaction(req)?;

        if self.kv.check_idempotency(&req.idempotency_key).await? {
            return Err(TransactionError::Duplicate);
        }

        let (from_wallet, to_wallet) = self.resolve_pair(req).await?;

        if from_wallet.currency != to_wallet.currency {
            return Err(TransactionError::CurrencyMismatch {
                from: from_wallet.currency,
                to: to_wallet.currency,
            });
        }

        if from_wallet.balance < amount {
            return Err(TransactionError::InsufficientFunds);
        }

        self.wallets
            .transfer(&TransferRequest {
                from_wallet_id: from_wallet.id,
                to_wallet_id: to_wallet.id,
                amount: req.amount.clone(),
                idempotency_key: req.idempotency_key.clone(),
                description: req.description.clone(),
            })
            .await?;

        let transaction = self
            .record_completed(
                NewTransaction {
                    from_wallet_id: req.from_wallet_id.clone(),
                    to_wallet_id: req.to_wallet_id.clone(),
                    amount,
                    currency: from_wallet.currency.clone(),
                    tx_type: TransactionType::P2p,
                    status: TransactionStatus::Completed,
                    description: req.description.clone(),
                    idempotency_key: req.idempotency_key.clone(),
                    scheduled_at: None,
                },
            )
            .await?;

        self.set_idempotency(&req.idempotency_key).await;

        info!(transaction_id = %transaction.id, "P2P transfer completed");
        Ok(transaction)
    }

    /// Batch transfer: all recipients are resolved and validated before any
    /// funds move, so a bad item rejects the whole batch with every wallet
    /// untouched. Item sub-keys derive from the batch key by index.
    pub async fn create_batch_transfer(
        &self,
        req: &CreateBatchTransactionRequest,
    ) -> Result<BatchTransferResponse, TransactionError> {
        let total = validate_create_batch(req)?;

        if self.kv.check_idempotency(&req.idempotency_key).await? {
            return Err(TransactionError::Duplicate);
        }

        let from_id = parse_wallet_id(&req.from_wallet_id)?;
        let from_wallet = self.wallets.get_wallet(from_id).await.map_err(|e| {
            annotate_wallet_error(e.into(), "source wallet")
        })?;

        if from_wallet.balance < total {
            return Err(TransactionError::InsufficientFunds);
        }

        // Resolve every recipient up front; nothing executes until the whole
        // batch validates.
        let mut recipients = Vec::with_capacity(req.transfers.len());
        for (i, item) in req.transfers.iter().enumerate() {
            let to_id = parse_wallet_id(&item.to_wallet_id)
                .map_err(|e| annotate_wallet_error(e, &format!("transfer[{i}] recipient")))?;
            let to_wallet = self.wallets.get_wallet(to_id).await.map_err(|e| {
                annotate_wallet_error(e.into(), &format!("transfer[{i}] recipient"))
            })?;
            if from_wallet.currency != to_wallet.currency {
                return Err(TransactionError::CurrencyMismatch {
                    from: from_wallet.currency.clone(),
                    to: to_wallet.currency,
                });
            }
            recipients.push(to_wallet);
        }

        let mut tx = self.db.pool().begin().await?;

        let batch = match self
            .repo
            .create_batch(
                &mut tx,
                &req.from_wallet_id,
                total,
                &from_wallet.currency,
                &req.idempotency_key,
            )
            .await
        {
            Ok(batch) => batch,
            Err(e) if is_unique_violation(&e) => return Err(TransactionError::Duplicate),
            Err(e) => return Err(e.into()),
        };

        let mut transactions = Vec::with_capacity(req.transfers.len());
        for (i, (item, to_wallet)) in req.transfers.iter().zip(&recipients).enumerate() {
            let sub_key = format!("{}-{i}", req.idempotency_key);

            self.wallets
                .transfer(&TransferRequest {
                    from_wallet_id: from_wallet.id,
                    to_wallet_id: to_wallet.id,
                    amount: item.amount.clone(),
                    idempotency_key: sub_key.clone(),
                    description: item.description.clone(),
                })
                .await?;

            let amount = Money::parse_positive(&item.amount)
                .map_err(|e| TransactionError::Validation(format!("transfer[{i}]: {e}")))?;

            let recorded = self
                .repo
                .create(
                    &mut tx,
                    &NewTransaction {
                        from_wallet_id: req.from_wallet_id.clone(),
                        to_wallet_id: item.to_wallet_id.clone(),
                        amount,
                        currency: from_wallet.currency.clone(),
                        tx_type: TransactionType::Batch,
                        status: TransactionStatus::Completed,
                        description: item.description.clone(),
                        idempotency_key: sub_key,
                        scheduled_at: None,
                    },
                )
                .await?;
            transactions.push(recorded);
        }

        self.repo
            .update_batch_status(&mut tx, batch.id, TransactionStatus::Completed)
            .await?;

        self.outbox
            .save_event(
                &mut tx,
                &NewOutboxEvent::new(
                    batch.id.to_string(),
                    TOPIC_BATCH_COMPLETED,
                    TOPIC_BATCH_COMPLETED,
                    json!({
                        "batch_id": batch.id,
                        "from_wallet_id": req.from_wallet_id,
                        "total_amount": total,
                        "count": req.transfers.len(),
                        "completed_at": Utc::now(),
                    }),
                ),
            )
            .await?;

        tx.commit().await?;

        self.set_idempotency(&req.idempotency_key).await;

        let mut batch = batch;
        batch.status = TransactionStatus::Completed;

        info!(batch_id = %batch.id, count = transactions.len(), "Batch transfer completed");
        Ok(BatchTransferResponse {
            batch,
            transactions,
        })
    }

    /// Scheduled transfer: record only. No balance check and no funds
    /// movement; the dispatcher executes it once the schedule is due.
    pub async fn create_scheduled_transfer(
        &self,
        req: &CreateScheduledTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let amount = validate_create_scheduled(req)?;

        if self.kv.check_idempotency(&req.idempotency_key).await? {
            return Err(TransactionError::Duplicate);
        }

        let from_id = parse_wallet_id(&req.from_wallet_id)?;
        let to_id = parse_wallet_id(&req.to_wallet_id)?;
        let from_wallet = self
            .wallets
            .get_wallet(from_id)
            .await
            .map_err(|e| annotate_wallet_error(e.into(), "source wallet"))?;
        let to_wallet = self
            .wallets
            .get_wallet(to_id)
            .await
            .map_err(|e| annotate_wallet_error(e.into(), "destination wallet"))?;

        if from_wallet.currency != to_wallet.currency {
            return Err(TransactionError::CurrencyMismatch {
                from: from_wallet.currency,
                to: to_wallet.currency,
            });
        }

        let transaction = match self
            .repo
            .create_direct(&NewTransaction {
                from_wallet_id: req.from_wallet_id.clone(),
                to_wallet_id: req.to_wallet_id.clone(),
                amount,
                currency: from_wallet.currency,
                tx_type: TransactionType::Scheduled,
                status: TransactionStatus::Scheduled,
                description: req.description.clone(),
                idempotency_key: req.idempotency_key.clone(),
                scheduled_at: Some(req.scheduled_at),
            })
            .await
        {
            Ok(t) => t,
            Err(e) if is_unique_violation(&e) => return Err(TransactionError::Duplicate),
            Err(e) => return Err(e.into()),
        };

        self.set_idempotency(&req.idempotency_key).await;

        info!(
            transaction_id = %transaction.id,
            scheduled_at = %req.scheduled_at,
            "Scheduled transfer created"
        );
        Ok(transaction)
    }

    /// Executes due scheduled transfers. Called by the dispatcher; returns
    /// the number executed this cycle.
    pub async fn process_scheduled_transfers(
        &self,
        limit: i64,
    ) -> Result<usize, TransactionError> {
        let due = self.repo.get_due_scheduled(limit).await?;
        if due.is_empty() {
            return Ok(0);
        }

        info!(count = due.len(), "Processing scheduled transfers");

        let mut processed = 0;
        for transaction in due {
            match self.execute_scheduled(&transaction).await {
                Ok(()) => processed += 1,
                Err(e) => {
                    error!(
                        transaction_id = %transaction.id,
                        error = %e,
                        "Failed to execute scheduled transfer"
                    );
                    if let Err(mark_err) =
                        self.repo.mark_failed(transaction.id, &e.to_string()).await
                    {
                        error!(
                            transaction_id = %transaction.id,
                            error = %mark_err,
                            "Failed to mark scheduled transfer as failed"
                        );
                    }
                }
            }
        }

        Ok(processed)
    }

    /// One scheduled execution. The derived key `scheduled-{id}` makes the
    /// wallet-side transfer idempotent across dispatcher crashes: a restart
    /// that re-claims the row hits `Duplicate` on the transfer and still
    /// re-applies the status update.
    async fn execute_scheduled(&self, transaction: &Transaction) -> Result<(), TransactionError> {
        let from_id = parse_wallet_id(&transaction.from_wallet_id)?;
        let to_id = parse_wallet_id(&transaction.to_wallet_id)?;

        let from_wallet = self
            .wallets
            .get_wallet(from_id)
            .await
            .map_err(|e| annotate_wallet_error(e.into(), "source wallet"))?;
        self.wallets
            .get_wallet(to_id)
            .await
            .map_err(|e| annotate_wallet_error(e.into(), "destination wallet"))?;

        if from_wallet.balance < transaction.amount {
            return Err(TransactionError::InsufficientFunds);
        }

        let derived_key = format!("scheduled-{}", transaction.id);
        match self
            .wallets
            .transfer(&TransferRequest {
                from_wallet_id: from_id,
                to_wallet_id: to_id,
                amount: transaction.amount.to_string(),
                idempotency_key: derived_key,
                description: transaction.description.clone(),
            })
            .await
        {
            Ok(()) => {}
            // An earlier run already moved the funds; fall through and
            // re-apply the status update.
            Err(e) if e.is_duplicate() => {
                warn!(
                    transaction_id = %transaction.id,
                    "Scheduled transfer already executed, re-applying status"
                );
            }
            Err(e) => return Err(e.into()),
        }

        let mut tx = self.db.pool().begin().await?;
        self.repo
            .update_status(&mut tx, transaction.id, TransactionStatus::Completed)
            .await?;
        self.save_completed_event(&mut tx, transaction.id, transaction).await?;
        tx.commit().await?;

        info!(transaction_id = %transaction.id, "Scheduled transfer executed");
        Ok(())
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<Transaction, TransactionError> {
        self.repo.get(id).await?.ok_or(TransactionError::NotFound)
    }

    pub async fn list_transactions_by_wallet(
        &self,
        wallet_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, TransactionError> {
        Ok(self.repo.list_by_wallet(wallet_id, limit, offset).await?)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn resolve_pair(
        &self,
        req: &CreateTransactionRequest,
    ) -> Result<(WalletInfo, WalletInfo), TransactionError> {
        let from_id = parse_wallet_id(&req.from_wallet_id)?;
        let to_id = parse_wallet_id(&req.to_wallet_id)?;

        let from_wallet = self
            .wallets
            .get_wallet(from_id)
            .await
            .map_err(|e| annotate_wallet_error(e.into(), "source wallet"))?;
        let to_wallet = self
            .wallets
            .get_wallet(to_id)
            .await
            .map_err(|e| annotate_wallet_error(e.into(), "destination wallet"))?;

        Ok((from_wallet, to_wallet))
    }

    /// Insert the completed row and its `transaction.completed` outbox event
    /// atomically. A unique violation means another execution won the race
    /// (or a crashed one already committed): surfaced as `Duplicate`.
    async fn record_completed(
        &self,
        row: NewTransaction,
    ) -> Result<Transaction, TransactionError> {
        let mut tx = self.db.pool().begin().await?;

        let transaction = match self.repo.create(&mut tx, &row).await {
            Ok(t) => t,
            Err(e) if is_unique_violation(&e) => return Err(TransactionError::Duplicate),
            Err(e) => return Err(e.into()),
        };

        self.save_completed_event(&mut tx, transaction.id, &transaction)
            .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn save_completed_event(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transaction_id: Uuid,
        transaction: &Transaction,
    ) -> Result<(), TransactionError> {
        self.outbox
            .save_event(
                tx,
                &NewOutboxEvent::new(
                    transaction_id.to_string(),
                    TOPIC_TRANSACTION_COMPLETED,
                    TOPIC_TRANSACTION_COMPLETED,
                    json!({
                        "transaction_id": transaction_id,
                        "from_wallet_id": transaction.from_wallet_id,
                        "to_wallet_id": transaction.to_wallet_id,
                        "amount": transaction.amount,
                        "currency": transaction.currency,
                        "type": transaction.tx_type,
                        "completed_at": Utc::now(),
                    }),
                ),
            )
            .await?;
        Ok(())
    }

    async fn set_idempotency(&self, key: &str) {
        if let Err(e) = self.kv.set_idempotency(key).await {
            warn!(error = %e, "Failed to set idempotency key");
        }
    }
}

fn parse_wallet_id(raw: &str) -> Result<Uuid, TransactionError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TransactionError::Validation(format!("invalid wallet id: {raw}")))
}

fn annotate_wallet_error(err: TransactionError, context: &str) -> TransactionError {
    match err {
        TransactionError::WalletUnavailable(msg) => {
            TransactionError::WalletUnavailable(format!("{context}: {msg}"))
        }
        other => other,
    }
}
