//! Short-TTL key-value store
//!
//! Admission control for idempotency keys, short-lived wallet locks, and the
//! read caches all go through [`KvStore`]. The store itself is a contract
//! ([`KvBackend`]): the engines never see the concrete backend, so a Redis
//! deployment plugs in behind the same trait as the in-process [`MemoryKv`].
//!
//! The KV store is the fast path only. The database uniqueness constraint on
//! `idempotency_key` is the backstop if the store is lost, and every lock
//! carries a TTL so crashed holders release automatically.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Idempotency admissions are remembered for this long.
pub const IDEMPOTENCY_TTL: Duration = Duration::from_secs(30 * 60);

/// Wallet locks expire after this long if the holder dies.
pub const WALLET_LOCK_TTL: Duration = Duration::from_secs(5);

/// Cached wallet balances are served for at most this long.
pub const BALANCE_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Error)]
pub enum KvError {
    #[error("kv backend error: {0}")]
    Backend(String),
}

/// Minimal contract a TTL key-value service must provide.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Set `key` only if absent. Returns true when this caller won the slot.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, KvError>;

    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    async fn delete(&self, key: &str) -> Result<(), KvError>;

    /// Remove every key containing `fragment`. Mirrors a SCAN/MATCH sweep.
    async fn delete_matching(&self, fragment: &str) -> Result<u64, KvError>;
}

/// In-process TTL map. Entries expire lazily on access.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self, key: &str) -> Option<String> {
        // The read guard must be released before removing an expired entry.
        let expired = match self.entries.get(key) {
            Some(entry) if entry.1 > Instant::now() => return Some(entry.0.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, KvError> {
        let deadline = Instant::now() + ttl;
        let mut won = false;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| {
                won = true;
                (value.to_string(), deadline)
            });
        if !won && entry.1 <= Instant::now() {
            // Expired holder: take over the slot.
            *entry = (value.to_string(), deadline);
            won = true;
        }
        Ok(won)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.live(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn delete_matching(&self, fragment: &str) -> Result<u64, KvError> {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.key().contains(fragment))
            .map(|e| e.key().clone())
            .collect();
        let removed = keys.len() as u64;
        for key in keys {
            self.entries.remove(&key);
        }
        Ok(removed)
    }
}

/// Domain-level wrapper over the backend: idempotency admission, wallet
/// locks, and the read caches.
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn KvBackend>,
}

impl KvStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKv::new()))
    }

    /// True if the idempotency key has already been admitted.
    pub async fn check_idempotency(&self, key: &str) -> Result<bool, KvError> {
        Ok(self
            .backend
            .get(&format!("idempotency:{key}"))
            .await?
            .is_some())
    }

    /// Record an admitted idempotency key. Called after the business commit;
    /// a crash before this call is safe because the database unique
    /// constraint blocks re-execution.
    pub async fn set_idempotency(&self, key: &str) -> Result<(), KvError> {
        self.backend
            .set(&format!("idempotency:{key}"), "1", IDEMPOTENCY_TTL)
            .await
    }

    /// Non-blocking distributed lock. Returns false under contention.
    pub async fn acquire_lock(&self, key: &str, ttl: Duration) -> Result<bool, KvError> {
        self.backend.set_nx(&format!("lock:{key}"), "1", ttl).await
    }

    pub async fn release_lock(&self, key: &str) -> Result<(), KvError> {
        self.backend.delete(&format!("lock:{key}")).await
    }

    pub fn wallet_lock_key(wallet_id: &str) -> String {
        format!("wallet:{wallet_id}")
    }

    pub async fn get_cached_wallet_balance(
        &self,
        wallet_id: &str,
    ) -> Result<Option<String>, KvError> {
        self.backend.get(&format!("wallet:balance:{wallet_id}")).await
    }

    pub async fn cache_wallet_balance(
        &self,
        wallet_id: &str,
        balance: &str,
    ) -> Result<(), KvError> {
        self.backend
            .set(
                &format!("wallet:balance:{wallet_id}"),
                balance,
                BALANCE_CACHE_TTL,
            )
            .await
    }

    pub async fn invalidate_wallet_balance(&self, wallet_id: &str) -> Result<(), KvError> {
        self.backend.delete(&format!("wallet:balance:{wallet_id}")).await
    }

    /// Cached query results (analytics read side).
    pub async fn get_cached(&self, key: &str) -> Result<Option<String>, KvError> {
        self.backend.get(key).await
    }

    pub async fn cache(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        self.backend.set(key, value, ttl).await
    }

    /// Drop every analytics cache entry touching the given date key.
    pub async fn invalidate_analytics_date(&self, date: &str) -> Result<u64, KvError> {
        self.backend.delete_matching(date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn idempotency_admission_is_first_wins() {
        let kv = KvStore::in_memory();
        assert!(!kv.check_idempotency("k1").await.unwrap());
        kv.set_idempotency("k1").await.unwrap();
        assert!(kv.check_idempotency("k1").await.unwrap());
        assert!(!kv.check_idempotency("k2").await.unwrap());
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_released() {
        let kv = KvStore::in_memory();
        let key = KvStore::wallet_lock_key("w1");
        assert!(kv.acquire_lock(&key, Duration::from_secs(5)).await.unwrap());
        assert!(!kv.acquire_lock(&key, Duration::from_secs(5)).await.unwrap());
        kv.release_lock(&key).await.unwrap();
        assert!(kv.acquire_lock(&key, Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn lock_expires_after_ttl() {
        let kv = KvStore::in_memory();
        assert!(
            kv.acquire_lock("w2", Duration::from_millis(20))
                .await
                .unwrap()
        );
        tokio::time::sleep(Duration::from_millis(40)).await;
        // Crashed holder: TTL frees the slot for the next caller.
        assert!(
            kv.acquire_lock("w2", Duration::from_millis(20))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn balance_cache_roundtrip_and_invalidation() {
        let kv = KvStore::in_memory();
        assert!(kv.get_cached_wallet_balance("w1").await.unwrap().is_none());
        kv.cache_wallet_balance("w1", "450.0000").await.unwrap();
        assert_eq!(
            kv.get_cached_wallet_balance("w1").await.unwrap().as_deref(),
            Some("450.0000")
        );
        kv.invalidate_wallet_balance("w1").await.unwrap();
        assert!(kv.get_cached_wallet_balance("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn analytics_invalidation_sweeps_matching_keys() {
        let kv = KvStore::in_memory();
        kv.cache("analytics:daily:2026-08-01:2026-08-02", "[]", Duration::from_secs(60))
            .await
            .unwrap();
        kv.cache("analytics:summary:daily:2026-08-01", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        kv.cache("analytics:daily:2026-07-01:2026-07-02", "[]", Duration::from_secs(60))
            .await
            .unwrap();

        let removed = kv.invalidate_analytics_date("2026-08-01").await.unwrap();
        assert_eq!(removed, 2);
        assert!(
            kv.get_cached("analytics:daily:2026-07-01:2026-07-02")
                .await
                .unwrap()
                .is_some()
        );
    }
}
