//! Bus consumer feeding the analytics aggregates.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use crate::bus::EventBus;

use super::service::{AnalyticsService, TOPIC_ENTRY_CREATED};

pub const CONSUMER_GROUP: &str = "analytics";

pub struct AnalyticsConsumer {
    service: AnalyticsService,
    bus: Arc<dyn EventBus>,
}

impl AnalyticsConsumer {
    pub fn new(service: AnalyticsService, bus: Arc<dyn EventBus>) -> Self {
        Self { service, bus }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut rx = self.bus.subscribe(TOPIC_ENTRY_CREATED, CONSUMER_GROUP).await;
        info!(topic = TOPIC_ENTRY_CREATED, "Analytics consumer started");

        loop {
            tokio::select! {
                envelope = rx.recv() => {
                    let Some(envelope) = envelope else {
                        info!("Analytics consumer channel closed");
                        return;
                    };
                    if let Err(e) = self.service.process_ledger_event(&envelope).await {
                        error!(
                            event_id = %envelope.event_id,
                            error = %e,
                            "Failed to process ledger event"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    info!("Analytics consumer shutting down");
                    return;
                }
            }
        }
    }
}
