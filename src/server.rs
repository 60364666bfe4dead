//! Service assembly: routers, workers, graceful shutdown.
//!
//! One process hosts one of the five services (or all of them for local
//! runs, sharing one in-process bus so events actually flow end to end).
//! Long-lived workers (outbox relay, scheduled dispatcher, bus consumers)
//! are tokio tasks started at boot and cancelled through a `watch` channel
//! tied to the process shutdown signal.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analytics::{self, AnalyticsConsumer, AnalyticsRepository, AnalyticsService};
use crate::auth::{self, AuthService, require_auth};
use crate::bus::EventBus;
use crate::config::{AppConfig, ServiceKind};
use crate::db::Database;
use crate::inbox::InboxRepository;
use crate::kv::KvStore;
use crate::ledger::{self, LedgerConsumer, LedgerRepository, LedgerService};
use crate::outbox::{OutboxRelay, OutboxRepository, RelayConfig};
use crate::peer::WalletClient;
use crate::schema::schema_for;
use crate::state::AppState;
use crate::transaction::{
    self, DispatcherConfig, ScheduledDispatcher, TransactionRepository, TransactionService,
};
use crate::wallet::{self, WalletRepository, WalletService};

/// Boot one service and serve it until shutdown.
pub async fn run_service(
    kind: ServiceKind,
    config: AppConfig,
    kv: KvStore,
    bus: Arc<dyn EventBus>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let section = config.service(kind).clone();

    let db = Database::connect(&section.database_url).await?;
    db.ensure_schema(&schema_for(kind)).await?;

    let state = build_state(kind, &config, db, kv, bus)?;
    spawn_workers(kind, &config, &state, shutdown.clone());

    let app = router(kind, state.clone());
    let addr = format!("{}:{}", section.host, section.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(service = %kind, addr = %addr, "Service listening");

    let mut shutdown = shutdown;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    info!(service = %kind, "Service stopped");
    Ok(())
}

/// Local topology: every service in one process, one shared KV store and one
/// shared in-process bus, so the whole pipeline runs end to end.
pub async fn run_all(
    config: AppConfig,
    kv: KvStore,
    bus: Arc<dyn EventBus>,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let kinds = [
        ServiceKind::Auth,
        ServiceKind::Wallet,
        ServiceKind::Transaction,
        ServiceKind::Ledger,
        ServiceKind::Analytics,
    ];

    let mut handles = Vec::new();
    for kind in kinds {
        let config = config.clone();
        let kv = kv.clone();
        let bus = bus.clone();
        let shutdown = shutdown.clone();
        handles.push(tokio::spawn(async move {
            run_service(kind, config, kv, bus, shutdown).await
        }));
    }

    for handle in handles {
        handle.await??;
    }
    Ok(())
}

fn build_state(
    kind: ServiceKind,
    config: &AppConfig,
    db: Database,
    kv: KvStore,
    bus: Arc<dyn EventBus>,
) -> anyhow::Result<Arc<AppState>> {
    let pool = db.pool().clone();
    let outbox = OutboxRepository::new(pool.clone());

    let mut state = AppState {
        config: config.clone(),
        kind,
        db: db.clone(),
        kv: kv.clone(),
        bus,
        auth: None,
        wallets: None,
        transactions: None,
        ledger: None,
        analytics: None,
    };

    match kind {
        ServiceKind::Auth => {
            state.auth = Some(AuthService::new(pool, config.jwt_secret.clone()));
        }
        ServiceKind::Wallet => {
            state.wallets = Some(WalletService::new(
                WalletRepository::new(pool),
                outbox,
                kv,
                db,
            ));
        }
        ServiceKind::Transaction => {
            let client = Arc::new(WalletClient::new(&config.peer)?);
            state.transactions = Some(TransactionService::new(
                TransactionRepository::new(pool),
                outbox,
                kv,
                db,
                client,
            ));
        }
        ServiceKind::Ledger => {
            state.ledger = Some(LedgerService::new(
                LedgerRepository::new(pool.clone()),
                outbox,
                InboxRepository::new(pool),
                db,
            ));
        }
        ServiceKind::Analytics => {
            state.analytics = Some(AnalyticsService::new(
                AnalyticsRepository::new(pool.clone()),
                InboxRepository::new(pool),
                kv,
                db,
            ));
        }
    }

    Ok(Arc::new(state))
}

fn spawn_workers(
    kind: ServiceKind,
    config: &AppConfig,
    state: &Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) {
    // Producing services run an outbox relay.
    if matches!(
        kind,
        ServiceKind::Wallet | ServiceKind::Transaction | ServiceKind::Ledger
    ) {
        let relay = OutboxRelay::new(
            OutboxRepository::new(state.db.pool().clone()),
            state.bus.clone(),
            RelayConfig::from(&config.workers),
        );
        let relay_shutdown = shutdown.clone();
        tokio::spawn(async move { relay.run(relay_shutdown).await });
    }

    match kind {
        ServiceKind::Transaction => {
            let dispatcher = ScheduledDispatcher::new(
                state
                    .transactions
                    .clone()
                    .expect("transaction service configured"),
                DispatcherConfig::from(&config.workers),
            );
            let dispatcher_shutdown = shutdown.clone();
            tokio::spawn(async move { dispatcher.run(dispatcher_shutdown).await });
        }
        ServiceKind::Ledger => {
            let consumer = LedgerConsumer::new(
                state.ledger.clone().expect("ledger service configured"),
                state.bus.clone(),
            );
            let consumer_shutdown = shutdown.clone();
            tokio::spawn(async move { consumer.run(consumer_shutdown).await });
        }
        ServiceKind::Analytics => {
            let consumer = AnalyticsConsumer::new(
                state
                    .analytics
                    .clone()
                    .expect("analytics service configured"),
                state.bus.clone(),
            );
            let consumer_shutdown = shutdown.clone();
            tokio::spawn(async move { consumer.run(consumer_shutdown).await });
        }
        _ => {}
    }
}

fn router(kind: ServiceKind, state: Arc<AppState>) -> Router {
    let api = match kind {
        ServiceKind::Auth => {
            let open = Router::new()
                .route("/api/v1/register", post(auth::handlers::register))
                .route("/api/v1/login", post(auth::handlers::login))
                .route("/api/v1/refresh", post(auth::handlers::refresh));
            let protected = Router::new()
                .route("/api/v1/me", get(auth::handlers::me))
                .layer(middleware::from_fn_with_state(state.clone(), require_auth));
            open.merge(protected)
        }
        ServiceKind::Wallet => {
            let public = Router::new()
                .route("/api/v1/wallets", post(wallet::handlers::create_wallet))
                .route(
                    "/api/v1/wallets/my-wallets",
                    get(wallet::handlers::my_wallets),
                )
                .route("/api/v1/wallets/{id}", get(wallet::handlers::get_wallet))
                .route(
                    "/api/v1/wallets/{id}/deposit",
                    post(wallet::handlers::deposit),
                )
                .route(
                    "/api/v1/wallets/{id}/withdraw",
                    post(wallet::handlers::withdraw),
                )
                .route(
                    "/api/v1/wallets/{id}/events",
                    get(wallet::handlers::wallet_events),
                )
                .layer(middleware::from_fn_with_state(state.clone(), require_auth));
            // Internal surface: authenticated at the transport layer (mTLS),
            // never with user tokens.
            let internal = Router::new()
                .route(
                    "/api/v1/internal/wallets/{id}",
                    get(wallet::handlers::internal_get_wallet),
                )
                .route(
                    "/api/v1/internal/wallets/transfer",
                    post(wallet::handlers::internal_transfer),
                );
            public.merge(internal)
        }
        ServiceKind::Transaction => Router::new()
            .route(
                "/api/v1/transactions",
                post(transaction::handlers::create_transaction)
                    .get(transaction::handlers::list_transactions),
            )
            .route(
                "/api/v1/transactions/batch",
                post(transaction::handlers::create_batch_transaction),
            )
            .route(
                "/api/v1/transactions/scheduled",
                post(transaction::handlers::create_scheduled_transaction),
            )
            .route(
                "/api/v1/transactions/{id}",
                get(transaction::handlers::get_transaction),
            )
            .layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        ServiceKind::Ledger => Router::new()
            .route("/api/v1/ledger", get(ledger::handlers::get_all_entries))
            .route(
                "/api/v1/ledger/transaction/{id}",
                get(ledger::handlers::get_transaction_ledger),
            )
            .route(
                "/api/v1/ledger/wallet",
                get(ledger::handlers::get_wallet_ledger),
            )
            .route(
                "/api/v1/ledger/wallet/stats",
                get(ledger::handlers::get_wallet_stats),
            )
            .route("/api/v1/ledger/{id}", get(ledger::handlers::get_entry))
            .layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        ServiceKind::Analytics => Router::new()
            .route(
                "/api/v1/analytics/daily",
                get(analytics::handlers::get_daily_metrics),
            )
            .route(
                "/api/v1/analytics/hourly",
                get(analytics::handlers::get_hourly_metrics),
            )
            .route(
                "/api/v1/analytics/summary",
                get(analytics::handlers::get_summary),
            )
            .route(
                "/api/v1/analytics/me",
                get(analytics::handlers::get_my_analytics),
            )
            .route(
                "/api/v1/analytics/me/snapshots",
                get(analytics::handlers::get_my_snapshots),
            )
            .layer(middleware::from_fn_with_state(state.clone(), require_auth)),
    };

    api.route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> crate::gateway::ApiResult<&'static str> {
    match state.db.health_check().await {
        Ok(()) => crate::gateway::ok("ok"),
        Err(e) => crate::gateway::ApiError::service_unavailable(e.to_string()).into_err(),
    }
}
