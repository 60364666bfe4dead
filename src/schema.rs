//! Embedded DDL per service store.
//!
//! Each service owns its own PostgreSQL database; the binary applies the
//! matching script at startup. All statements are idempotent so restarts and
//! test setups can re-run them safely.

use crate::config::ServiceKind;

/// Outbox table, present in every producing service's store.
const OUTBOX_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS outbox_events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    aggregate_id VARCHAR(255) NOT NULL,
    event_type VARCHAR(100) NOT NULL,
    topic VARCHAR(100) NOT NULL,
    payload JSONB NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    attempts INT NOT NULL DEFAULT 0,
    last_error TEXT,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    published_at TIMESTAMP WITH TIME ZONE
);

CREATE INDEX IF NOT EXISTS idx_outbox_status ON outbox_events(status, created_at);
CREATE INDEX IF NOT EXISTS idx_outbox_aggregate ON outbox_events(aggregate_id);
"#;

/// Inbox table, present in every consuming service's store. Uniqueness on
/// event_id is what makes consumption at-most-once.
const INBOX_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS event_processing_log (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    event_id VARCHAR(255) NOT NULL UNIQUE,
    event_type VARCHAR(100) NOT NULL,
    topic VARCHAR(100) NOT NULL,
    partition INT NOT NULL DEFAULT 0,
    "offset" BIGINT NOT NULL DEFAULT 0,
    status VARCHAR(20) NOT NULL DEFAULT 'processed',
    processing_time_ms INT NOT NULL DEFAULT 0,
    error_message TEXT,
    processed_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_event_log_topic ON event_processing_log(topic, processed_at);
"#;

const AUTH_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(100) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS refresh_tokens (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token VARCHAR(255) NOT NULL UNIQUE,
    expires_at TIMESTAMP WITH TIME ZONE NOT NULL,
    revoked BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user ON refresh_tokens(user_id);
"#;

const WALLET_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS wallets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    balance NUMERIC(20, 4) NOT NULL DEFAULT 0.0000,
    status VARCHAR(20) NOT NULL DEFAULT 'active',
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    CONSTRAINT positive_balance CHECK (balance >= 0),
    CONSTRAINT unique_user_currency UNIQUE(user_id, currency)
);

CREATE TABLE IF NOT EXISTS wallet_events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_id UUID NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    event_type VARCHAR(50) NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    balance_before NUMERIC(20, 4) NOT NULL,
    balance_after NUMERIC(20, 4) NOT NULL,
    metadata JSONB,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_wallet_events_wallet ON wallet_events(wallet_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_wallets_user ON wallets(user_id);
"#;

const TRANSACTION_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    from_wallet_id VARCHAR(255) NOT NULL,
    to_wallet_id VARCHAR(255) NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    type VARCHAR(20) NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    description TEXT,
    idempotency_key VARCHAR(255) UNIQUE NOT NULL,
    scheduled_at TIMESTAMP WITH TIME ZONE,
    processed_at TIMESTAMP WITH TIME ZONE,
    failure_reason TEXT,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    CHECK (amount > 0),
    CHECK (from_wallet_id <> to_wallet_id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_from_wallet ON transactions(from_wallet_id);
CREATE INDEX IF NOT EXISTS idx_transactions_to_wallet ON transactions(to_wallet_id);
CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions(status);
CREATE INDEX IF NOT EXISTS idx_transactions_scheduled
    ON transactions(scheduled_at) WHERE status = 'scheduled';

CREATE TABLE IF NOT EXISTS batch_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    from_wallet_id VARCHAR(255) NOT NULL,
    total_amount NUMERIC(20, 4) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    idempotency_key VARCHAR(255) UNIQUE NOT NULL,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);
"#;

const LEDGER_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS ledger_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id VARCHAR(255) NOT NULL,
    wallet_id VARCHAR(255) NOT NULL,
    entry_type VARCHAR(10) NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    currency VARCHAR(3) NOT NULL,
    balance NUMERIC(20, 4) NOT NULL,
    description TEXT,
    metadata JSONB,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    CHECK (entry_type IN ('debit', 'credit')),
    CHECK (amount > 0)
);

CREATE INDEX IF NOT EXISTS idx_ledger_transaction ON ledger_entries(transaction_id);
CREATE INDEX IF NOT EXISTS idx_ledger_wallet ON ledger_entries(wallet_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_ledger_created ON ledger_entries(created_at DESC);
"#;

const ANALYTICS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS daily_metrics (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    metric_date DATE NOT NULL UNIQUE,
    total_transactions BIGINT NOT NULL DEFAULT 0,
    total_volume NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_fees NUMERIC(20, 4) NOT NULL DEFAULT 0,
    unique_users BIGINT NOT NULL DEFAULT 0,
    successful_transactions BIGINT NOT NULL DEFAULT 0,
    failed_transactions BIGINT NOT NULL DEFAULT 0,
    avg_transaction_value NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS hourly_metrics (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    metric_hour TIMESTAMP WITH TIME ZONE NOT NULL UNIQUE,
    total_transactions BIGINT NOT NULL DEFAULT 0,
    total_volume NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_fees NUMERIC(20, 4) NOT NULL DEFAULT 0,
    unique_users BIGINT NOT NULL DEFAULT 0,
    successful_transactions BIGINT NOT NULL DEFAULT 0,
    failed_transactions BIGINT NOT NULL DEFAULT 0,
    avg_transaction_value NUMERIC(20, 4) NOT NULL DEFAULT 0,
    max_transaction_value NUMERIC(20, 4) NOT NULL DEFAULT 0,
    min_transaction_value NUMERIC(20, 4) NOT NULL DEFAULT 0,
    avg_processing_time_ms NUMERIC(12, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS user_snapshots (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id VARCHAR(255) NOT NULL,
    snapshot_date DATE NOT NULL,
    total_sent NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_received NUMERIC(20, 4) NOT NULL DEFAULT 0,
    transaction_count BIGINT NOT NULL DEFAULT 0,
    sent_count BIGINT NOT NULL DEFAULT 0,
    received_count BIGINT NOT NULL DEFAULT 0,
    total_fees_paid NUMERIC(20, 4) NOT NULL DEFAULT 0,
    last_transaction_at TIMESTAMP WITH TIME ZONE,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
    CONSTRAINT unique_user_snapshot UNIQUE(user_id, snapshot_date)
);

CREATE INDEX IF NOT EXISTS idx_user_snapshots_user ON user_snapshots(user_id, snapshot_date DESC);
"#;

/// Full DDL script for one service's store.
pub fn schema_for(kind: ServiceKind) -> String {
    match kind {
        ServiceKind::Auth => AUTH_DDL.to_string(),
        ServiceKind::Wallet => format!("{WALLET_DDL}\n{OUTBOX_DDL}"),
        ServiceKind::Transaction => format!("{TRANSACTION_DDL}\n{OUTBOX_DDL}"),
        ServiceKind::Ledger => format!("{LEDGER_DDL}\n{OUTBOX_DDL}\n{INBOX_DDL}"),
        ServiceKind::Analytics => format!("{ANALYTICS_DDL}\n{INBOX_DDL}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producers_carry_outbox_consumers_carry_inbox() {
        assert!(schema_for(ServiceKind::Wallet).contains("outbox_events"));
        assert!(schema_for(ServiceKind::Transaction).contains("outbox_events"));
        assert!(schema_for(ServiceKind::Ledger).contains("outbox_events"));
        assert!(schema_for(ServiceKind::Ledger).contains("event_processing_log"));
        assert!(schema_for(ServiceKind::Analytics).contains("event_processing_log"));
        assert!(!schema_for(ServiceKind::Auth).contains("outbox_events"));
    }

    #[test]
    fn scheduled_dispatch_uses_partial_index() {
        let ddl = schema_for(ServiceKind::Transaction);
        assert!(ddl.contains("WHERE status = 'scheduled'"));
    }
}
