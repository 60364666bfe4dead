//! Repository layer for analytics aggregates.
//!
//! All writes are additive upserts: counters and sums accumulate, the
//! running average is recomputed in SQL, extremes fold with GREATEST/LEAST.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{DailyMetric, HourlyMetric, UserAnalytics, UserSnapshot};
use crate::money::Money;

const DAILY_COLUMNS: &str = "id, metric_date, total_transactions, total_volume, total_fees, \
     unique_users, successful_transactions, failed_transactions, avg_transaction_value, \
     created_at, updated_at";

const HOURLY_COLUMNS: &str = "id, metric_hour, total_transactions, total_volume, total_fees, \
     unique_users, successful_transactions, failed_transactions, avg_transaction_value, \
     max_transaction_value, min_transaction_value, avg_processing_time_ms, created_at, updated_at";

const SNAPSHOT_COLUMNS: &str = "id, user_id, snapshot_date, total_sent, total_received, \
     transaction_count, sent_count, received_count, total_fees_paid, last_transaction_at, \
     created_at, updated_at";

/// One event's contribution to a metric bucket.
#[derive(Debug, Clone)]
pub struct MetricDelta {
    pub volume: Money,
    pub fee: Money,
    pub successful: i64,
    pub failed: i64,
    pub processing_time_ms: Decimal,
}

/// One event's contribution to a user snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotDelta {
    pub sent: Money,
    pub received: Money,
    pub sent_count: i64,
    pub received_count: i64,
    pub fee: Money,
    pub transaction_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn upsert_daily_metric(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        date: NaiveDate,
        delta: &MetricDelta,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO daily_metrics (
                   metric_date, total_transactions, total_volume, total_fees,
                   unique_users, successful_transactions, failed_transactions,
                   avg_transaction_value
               ) VALUES ($1, 1, $2, $3, 1, $4, $5, $2)
               ON CONFLICT (metric_date) DO UPDATE SET
                   total_transactions = daily_metrics.total_transactions + 1,
                   total_volume = daily_metrics.total_volume + EXCLUDED.total_volume,
                   total_fees = daily_metrics.total_fees + EXCLUDED.total_fees,
                   unique_users = EXCLUDED.unique_users,
                   successful_transactions =
                       daily_metrics.successful_transactions + EXCLUDED.successful_transactions,
                   failed_transactions =
                       daily_metrics.failed_transactions + EXCLUDED.failed_transactions,
                   avg_transaction_value = CASE
                       WHEN (daily_metrics.total_transactions + 1) > 0
                       THEN (daily_metrics.total_volume + EXCLUDED.total_volume)
                            / (daily_metrics.total_transactions + 1)
                       ELSE 0
                   END,
                   updated_at = CURRENT_TIMESTAMP"#,
        )
        .bind(date)
        .bind(delta.volume)
        .bind(delta.fee)
        .bind(delta.successful)
        .bind(delta.failed)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn upsert_hourly_metric(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        hour: DateTime<Utc>,
        delta: &MetricDelta,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO hourly_metrics (
                   metric_hour, total_transactions, total_volume, total_fees,
                   unique_users, successful_transactions, failed_transactions,
                   avg_transaction_value, max_transaction_value, min_transaction_value,
                   avg_processing_time_ms
               ) VALUES ($1, 1, $2, $3, 1, $4, $5, $2, $2, $2, $6)
               ON CONFLICT (metric_hour) DO UPDATE SET
                   total_transactions = hourly_metrics.total_transactions + 1,
                   total_volume = hourly_metrics.total_volume + EXCLUDED.total_volume,
                   total_fees = hourly_metrics.total_fees + EXCLUDED.total_fees,
                   unique_users = EXCLUDED.unique_users,
                   successful_transactions =
                       hourly_metrics.successful_transactions + EXCLUDED.successful_transactions,
                   failed_transactions =
                       hourly_metrics.failed_transactions + EXCLUDED.failed_transactions,
                   avg_transaction_value = CASE
                       WHEN (hourly_metrics.total_transactions + 1) > 0
                       THEN (hourly_metrics.total_volume + EXCLUDED.total_volume)
                            / (hourly_metrics.total_transactions + 1)
                       ELSE 0
                   END,
                   max_transaction_value =
                       GREATEST(hourly_metrics.max_transaction_value, EXCLUDED.max_transaction_value),
                   min_transaction_value =
                       LEAST(hourly_metrics.min_transaction_value, EXCLUDED.min_transaction_value),
                   avg_processing_time_ms =
                       ((hourly_metrics.avg_processing_time_ms * hourly_metrics.total_transactions)
                        + EXCLUDED.avg_processing_time_ms)
                       / (hourly_metrics.total_transactions + 1),
                   updated_at = CURRENT_TIMESTAMP"#,
        )
        .bind(hour)
        .bind(delta.volume)
        .bind(delta.fee)
        .bind(delta.successful)
        .bind(delta.failed)
        .bind(delta.processing_time_ms)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn upsert_user_snapshot(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        date: NaiveDate,
        delta: &SnapshotDelta,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO user_snapshots (
                   user_id, snapshot_date, total_sent, total_received, transaction_count,
                   sent_count, received_count, total_fees_paid, last_transaction_at
               ) VALUES ($1, $2, $3, $4, 1, $5, $6, $7, $8)
               ON CONFLICT (user_id, snapshot_date) DO UPDATE SET
                   total_sent = user_snapshots.total_sent + EXCLUDED.total_sent,
                   total_received = user_snapshots.total_received + EXCLUDED.total_received,
                   transaction_count = user_snapshots.transaction_count + 1,
                   sent_count = user_snapshots.sent_count + EXCLUDED.sent_count,
                   received_count = user_snapshots.received_count + EXCLUDED.received_count,
                   total_fees_paid = user_snapshots.total_fees_paid + EXCLUDED.total_fees_paid,
                   last_transaction_at =
                       GREATEST(user_snapshots.last_transaction_at, EXCLUDED.last_transaction_at),
                   updated_at = CURRENT_TIMESTAMP"#,
        )
        .bind(user_id)
        .bind(date)
        .bind(delta.sent)
        .bind(delta.received)
        .bind(delta.sent_count)
        .bind(delta.received_count)
        .bind(delta.fee)
        .bind(delta.transaction_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    // ========================================================================
    // Read side
    // ========================================================================

    pub async fn get_daily_metrics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyMetric>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"SELECT {DAILY_COLUMNS}
               FROM daily_metrics
               WHERE metric_date BETWEEN $1 AND $2
               ORDER BY metric_date DESC"#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_daily_metric_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyMetric>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"SELECT {DAILY_COLUMNS} FROM daily_metrics WHERE metric_date = $1"#
        ))
        .bind(date)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_hourly_metrics(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HourlyMetric>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"SELECT {HOURLY_COLUMNS}
               FROM hourly_metrics
               WHERE metric_hour BETWEEN $1 AND $2
               ORDER BY metric_hour DESC"#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    /// Range totals over the daily table.
    pub async fn summarize_daily(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(i64, Money, Money, i64, i64), sqlx::Error> {
        sqlx::query_as(
            r#"SELECT
                   COALESCE(SUM(total_transactions), 0)::BIGINT,
                   COALESCE(SUM(total_volume), 0),
                   COALESCE(SUM(total_fees), 0),
                   COALESCE(SUM(successful_transactions), 0)::BIGINT,
                   COALESCE(SUM(failed_transactions), 0)::BIGINT
               FROM daily_metrics
               WHERE metric_date BETWEEN $1 AND $2"#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_user_snapshots(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UserSnapshot>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"SELECT {SNAPSHOT_COLUMNS}
               FROM user_snapshots
               WHERE user_id = $1 AND snapshot_date BETWEEN $2 AND $3
               ORDER BY snapshot_date DESC"#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_user_analytics(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<UserAnalytics, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT
                   $1 AS user_id,
                   COALESCE(SUM(total_sent), 0) AS total_sent,
                   COALESCE(SUM(total_received), 0) AS total_received,
                   COALESCE(SUM(transaction_count), 0)::BIGINT AS transaction_count,
                   COALESCE(SUM(sent_count), 0)::BIGINT AS sent_count,
                   COALESCE(SUM(received_count), 0)::BIGINT AS received_count,
                   COALESCE(SUM(total_fees_paid), 0) AS total_fees_paid,
                   MAX(last_transaction_at) AS last_transaction_at
               FROM user_snapshots
               WHERE user_id = $1 AND snapshot_date BETWEEN $2 AND $3"#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
    }
}
