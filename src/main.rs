use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{info, warn};

use mercuria::bus::MemoryBus;
use mercuria::config::{AppConfig, ServiceKind};
use mercuria::kv::KvStore;
use mercuria::logging::init_logging;
use mercuria::server::{run_all, run_service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service_arg = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let env = std::env::var("MERCURIA_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            eprintln!("No config file for env '{env}' ({e:#}); using defaults");
            config
        }
    };

    let _guard = init_logging(&config);
    info!(env = %env, service = %service_arg, "Starting mercuria");
    if config.jwt_secret == AppConfig::default().jwt_secret {
        warn!("Using the default jwt_secret; set MERCURIA_JWT_SECRET in production");
    }

    // In-process implementations of the KV-store and bus contracts. A
    // multi-process deployment substitutes Redis/Kafka backends behind the
    // same traits.
    let kv = KvStore::in_memory();
    let bus = Arc::new(MemoryBus::new());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    match service_arg.as_str() {
        "all" => run_all(config, kv, bus, shutdown_rx).await,
        name => {
            let kind = ServiceKind::parse(name)
                .with_context(|| format!("unknown service '{name}' (expected auth, wallet, transaction, ledger, analytics or all)"))?;
            run_service(kind, config, kv, bus, shutdown_rx).await
        }
    }
}
