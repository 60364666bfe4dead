//! Wallet engine
//!
//! Owns the authoritative balance state. Every mutation happens under a
//! distributed wallet lock plus a row lock, appends a journal row to
//! `wallet_events`, and enqueues the matching outbox event in the same
//! database transaction.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::WalletError;
pub use models::{Wallet, WalletEvent, WalletEventType, WalletStatus};
pub use repository::WalletRepository;
pub use service::WalletService;
