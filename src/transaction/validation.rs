//! Request validation for the three transfer state machines.

use chrono::{Duration, Utc};
use std::collections::HashSet;

use super::error::TransactionError;
use super::models::{
    BatchTransferItem, CreateBatchTransactionRequest, CreateScheduledTransactionRequest,
    CreateTransactionRequest,
};
use crate::money::Money;

/// Batches are capped to keep the all-or-nothing transaction bounded.
pub const MAX_BATCH_SIZE: usize = 100;

/// Monetary amount: positive, numeric, max 4 decimal places.
pub fn validate_amount(amount: &str) -> Result<Money, TransactionError> {
    Money::parse_positive(amount.trim())
        .map_err(|e| TransactionError::Validation(format!("invalid amount: {e}")))
}

/// P2P transfer: distinct non-empty wallets, positive amount, non-empty key.
pub fn validate_create_transaction(
    req: &CreateTransactionRequest,
) -> Result<Money, TransactionError> {
    if req.from_wallet_id.trim().is_empty() {
        return Err(TransactionError::Validation(
            "from_wallet_id is required".to_string(),
        ));
    }
    if req.to_wallet_id.trim().is_empty() {
        return Err(TransactionError::Validation(
            "to_wallet_id is required".to_string(),
        ));
    }
    if req.from_wallet_id == req.to_wallet_id {
        return Err(TransactionError::Validation(
            "cannot transfer to the same wallet".to_string(),
        ));
    }
    if req.idempotency_key.trim().is_empty() {
        return Err(TransactionError::Validation(
            "idempotency_key is required".to_string(),
        ));
    }
    validate_amount(&req.amount)
}

/// Batch transfer: non-empty, bounded, no duplicate recipients, no
/// self-transfers, every item amount valid. Returns the batch total.
pub fn validate_create_batch(
    req: &CreateBatchTransactionRequest,
) -> Result<Money, TransactionError> {
    if req.from_wallet_id.trim().is_empty() {
        return Err(TransactionError::Validation(
            "from_wallet_id is required".to_string(),
        ));
    }
    if req.idempotency_key.trim().is_empty() {
        return Err(TransactionError::Validation(
            "idempotency_key is required".to_string(),
        ));
    }
    if req.transfers.is_empty() {
        return Err(TransactionError::Validation(
            "transfers list cannot be empty".to_string(),
        ));
    }
    if req.transfers.len() > MAX_BATCH_SIZE {
        return Err(TransactionError::Validation(format!(
            "batch cannot exceed {MAX_BATCH_SIZE} transfers"
        )));
    }

    let mut recipients = HashSet::new();
    let mut total = Money::ZERO;

    for (i, transfer) in req.transfers.iter().enumerate() {
        if transfer.to_wallet_id.trim().is_empty() {
            return Err(TransactionError::Validation(format!(
                "transfer[{i}]: to_wallet_id is required"
            )));
        }
        if transfer.to_wallet_id == req.from_wallet_id {
            return Err(TransactionError::Validation(format!(
                "transfer[{i}]: cannot transfer to source wallet"
            )));
        }
        if !recipients.insert(transfer.to_wallet_id.clone()) {
            return Err(TransactionError::Validation(format!(
                "transfer[{i}]: duplicate recipient {}",
                transfer.to_wallet_id
            )));
        }
        let amount = validate_amount(&transfer.amount)
            .map_err(|e| TransactionError::Validation(format!("transfer[{i}]: {e}")))?;
        total = total
            .checked_add(amount)
            .map_err(|e| TransactionError::Validation(format!("batch total: {e}")))?;
    }

    Ok(total)
}

/// Batch total for a balance check; assumes items already validated.
pub fn calculate_batch_total(transfers: &[BatchTransferItem]) -> Result<Money, TransactionError> {
    let mut total = Money::ZERO;
    for transfer in transfers {
        let amount = validate_amount(&transfer.amount)?;
        total = total
            .checked_add(amount)
            .map_err(|e| TransactionError::Validation(format!("batch total: {e}")))?;
    }
    Ok(total)
}

/// Scheduled transfer: normal transfer rules plus a schedule window of
/// strictly more than one minute and at most one year from now.
pub fn validate_create_scheduled(
    req: &CreateScheduledTransactionRequest,
) -> Result<Money, TransactionError> {
    let amount = validate_create_transaction(&CreateTransactionRequest {
        from_wallet_id: req.from_wallet_id.clone(),
        to_wallet_id: req.to_wallet_id.clone(),
        amount: req.amount.clone(),
        description: req.description.clone(),
        idempotency_key: req.idempotency_key.clone(),
    })?;

    let now = Utc::now();
    if req.scheduled_at <= now {
        return Err(TransactionError::Validation(
            "scheduled_at must be in the future".to_string(),
        ));
    }
    if req.scheduled_at < now + Duration::minutes(1) {
        return Err(TransactionError::Validation(
            "scheduled_at must be at least 1 minute in the future".to_string(),
        ));
    }
    if req.scheduled_at > now + Duration::days(365) {
        return Err(TransactionError::Validation(
            "scheduled_at cannot be more than 1 year in the future".to_string(),
        ));
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2p(from: &str, to: &str, amount: &str, key: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            from_wallet_id: from.to_string(),
            to_wallet_id: to.to_string(),
            amount: amount.to_string(),
            description: None,
            idempotency_key: key.to_string(),
        }
    }

    fn item(to: &str, amount: &str) -> BatchTransferItem {
        BatchTransferItem {
            to_wallet_id: to.to_string(),
            amount: amount.to_string(),
            description: None,
        }
    }

    #[test]
    fn p2p_requires_distinct_wallets_and_key() {
        assert!(validate_create_transaction(&p2p("w1", "w2", "50.00", "k1")).is_ok());
        assert!(validate_create_transaction(&p2p("w1", "w1", "50.00", "k1")).is_err());
        assert!(validate_create_transaction(&p2p("", "w2", "50.00", "k1")).is_err());
        assert!(validate_create_transaction(&p2p("w1", "w2", "50.00", " ")).is_err());
        assert!(validate_create_transaction(&p2p("w1", "w2", "0", "k1")).is_err());
        assert!(validate_create_transaction(&p2p("w1", "w2", "1.23456", "k1")).is_err());
    }

    #[test]
    fn batch_rules() {
        let base = CreateBatchTransactionRequest {
            from_wallet_id: "src".to_string(),
            transfers: vec![item("a", "50.00"), item("b", "25.00")],
            idempotency_key: "bk".to_string(),
        };
        assert_eq!(
            validate_create_batch(&base).unwrap(),
            Money::parse("75.0000").unwrap()
        );

        let mut empty = base.clone();
        empty.transfers.clear();
        assert!(validate_create_batch(&empty).is_err());

        let mut too_big = base.clone();
        too_big.transfers = (0..101).map(|i| item(&format!("w{i}"), "1.00")).collect();
        assert!(validate_create_batch(&too_big).is_err());

        let mut duplicate = base.clone();
        duplicate.transfers = vec![item("a", "1.00"), item("a", "2.00")];
        assert!(validate_create_batch(&duplicate).is_err());

        let mut self_transfer = base.clone();
        self_transfer.transfers = vec![item("src", "1.00")];
        assert!(validate_create_batch(&self_transfer).is_err());
    }

    #[test]
    fn schedule_window_is_one_minute_to_one_year() {
        let mut req = CreateScheduledTransactionRequest {
            from_wallet_id: "w1".to_string(),
            to_wallet_id: "w2".to_string(),
            amount: "50.00".to_string(),
            description: None,
            idempotency_key: "sk".to_string(),
            scheduled_at: Utc::now() + Duration::minutes(2),
        };
        assert!(validate_create_scheduled(&req).is_ok());

        req.scheduled_at = Utc::now() - Duration::minutes(1);
        assert!(validate_create_scheduled(&req).is_err());

        req.scheduled_at = Utc::now() + Duration::seconds(30);
        assert!(validate_create_scheduled(&req).is_err());

        req.scheduled_at = Utc::now() + Duration::days(400);
        assert!(validate_create_scheduled(&req).is_err());
    }

    #[test]
    fn batch_total_is_exact() {
        let transfers = vec![item("a", "0.0001"), item("b", "0.0002")];
        assert_eq!(
            calculate_batch_total(&transfers).unwrap(),
            Money::parse("0.0003").unwrap()
        );
    }
}
