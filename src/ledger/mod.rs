//! Ledger engine
//!
//! Immutable double-entry audit trail. Consumes `transaction.completed`,
//! writes one debit and one credit row per transaction with running balances,
//! and emits `ledger.entry_created` per entry. For any transaction the sum of
//! debits equals the sum of credits; the post-commit verifier alarms if not.

pub mod consumer;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use consumer::LedgerConsumer;
pub use error::LedgerError;
pub use models::{EntryType, LedgerEntry};
pub use repository::LedgerRepository;
pub use service::LedgerService;
