//! Bus consumer driving the ledger writer.
//!
//! Joins the `ledger` consumer group on `transaction.completed` and applies
//! each envelope through the service. A handler error leaves only a failed
//! inbox marker behind, so bus redelivery can retry.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::bus::EventBus;

use super::service::{LedgerService, TOPIC_TRANSACTION_COMPLETED};

pub const CONSUMER_GROUP: &str = "ledger";

pub struct LedgerConsumer {
    service: LedgerService,
    bus: Arc<dyn EventBus>,
}

impl LedgerConsumer {
    pub fn new(service: LedgerService, bus: Arc<dyn EventBus>) -> Self {
        Self { service, bus }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut rx = self
            .bus
            .subscribe(TOPIC_TRANSACTION_COMPLETED, CONSUMER_GROUP)
            .await;
        info!(topic = TOPIC_TRANSACTION_COMPLETED, "Ledger consumer started");

        loop {
            tokio::select! {
                envelope = rx.recv() => {
                    let Some(envelope) = envelope else {
                        info!("Ledger consumer channel closed");
                        return;
                    };
                    if let Err(e) = self.service.process_transaction_event(&envelope).await {
                        error!(
                            event_id = %envelope.event_id,
                            error = %e,
                            "Failed to process transaction event"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    info!("Ledger consumer shutting down");
                    return;
                }
            }
        }
    }
}
