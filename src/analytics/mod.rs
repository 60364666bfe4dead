//! Analytics ingestion
//!
//! Consumes `ledger.entry_created`, dedups on the envelope's event id, and
//! accumulates per-day, per-hour and per-user aggregates with additive
//! upserts. The read side serves cached metric queries.

pub mod consumer;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use consumer::AnalyticsConsumer;
pub use error::AnalyticsError;
pub use models::{DailyMetric, HourlyMetric, UserSnapshot};
pub use repository::AnalyticsRepository;
pub use service::AnalyticsService;
