//! Transaction engine
//!
//! Orchestrates peer-to-peer, batch and scheduled transfers across wallets.
//! All three state machines share the validation → admission → execution →
//! record pattern; execution happens remotely through the wallet engine's
//! transfer primitive, and the local `transactions` row plus its
//! `transaction.completed` outbox event commit in one database transaction.

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use dispatcher::{DispatcherConfig, ScheduledDispatcher};
pub use error::TransactionError;
pub use models::{BatchTransaction, Transaction, TransactionStatus, TransactionType};
pub use repository::TransactionRepository;
pub use service::TransactionService;
