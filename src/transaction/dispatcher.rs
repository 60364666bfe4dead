//! Scheduled-transfer dispatcher
//!
//! Background worker that drives future-dated transfers to completion. A
//! crash between execution and the status update is resolved by the derived
//! idempotency key: the next poll re-claims the row, the wallet engine
//! rejects the repeated transfer as a duplicate, and the status update is
//! re-applied.

use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::WorkerSettings;

use super::service::TransactionService;

/// Configuration for the scheduled dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// How often to poll for due transfers
    pub poll_interval: Duration,
    /// Maximum due rows claimed per cycle
    pub batch_size: i64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            batch_size: 100,
        }
    }
}

impl From<&WorkerSettings> for DispatcherConfig {
    fn from(settings: &WorkerSettings) -> Self {
        Self {
            poll_interval: Duration::from_secs(settings.dispatcher_poll_secs),
            batch_size: settings.dispatcher_batch_size,
        }
    }
}

pub struct ScheduledDispatcher {
    service: TransactionService,
    config: DispatcherConfig,
}

impl ScheduledDispatcher {
    pub fn new(service: TransactionService, config: DispatcherConfig) -> Self {
        Self { service, config }
    }

    /// Run the dispatcher loop until the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            batch_size = self.config.batch_size,
            "Starting scheduled-transfer dispatcher"
        );

        loop {
            match self
                .service
                .process_scheduled_transfers(self.config.batch_size)
                .await
            {
                Ok(0) => debug!("No scheduled transfers due"),
                Ok(count) => info!(count, "Dispatched scheduled transfers"),
                Err(e) => error!(error = %e, "Dispatcher cycle failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown.changed() => {
                    info!("Scheduled dispatcher shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_config_default() {
        let config = DispatcherConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.batch_size, 100);
    }
}
