//! Mercuria: a distributed financial transaction platform.
//!
//! Five cooperating services (auth, wallet, transaction, ledger, analytics)
//! communicate through a message bus and per-service PostgreSQL stores. The
//! core is the exactly-once transactional-event pipeline: idempotency-key
//! admission, the transactional outbox with its relay worker, inbox-deduped
//! consumers, the double-entry ledger, and the scheduled-transfer dispatcher.

pub mod analytics;
pub mod auth;
pub mod bus;
pub mod config;
pub mod db;
pub mod gateway;
pub mod inbox;
pub mod kv;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod openapi;
pub mod outbox;
pub mod peer;
pub mod schema;
pub mod server;
pub mod state;
pub mod transaction;
pub mod wallet;
