//! In-memory cache implementation.

use async_trait::async_trait;
use futures::future::BoxFuture;
use statements_core::{Cache, ExpiryPolicy, FixedTtl, Result};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Cache entry with fetch time for expiry checks.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
        }
    }

    fn is_stale(&self, policy: &dyn ExpiryPolicy) -> bool {
        policy.is_expired(self.cached_at.elapsed())
    }
}

/// One key's entry. Held locked for the duration of a fetch so that
/// concurrent callers for the same key wait instead of refetching.
type Slot<V> = Arc<Mutex<Option<CacheEntry<V>>>>;

/// In-memory keyed cache with a pluggable [`ExpiryPolicy`].
///
/// Values are cloned on every hit, so large payloads should be stored behind
/// an `Arc`. Data is lost when the cache is dropped.
pub struct InMemoryCache<K, V> {
    policy: Arc<dyn ExpiryPolicy>,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Debug for InMemoryCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("policy", &self.policy)
            .field("slots", &self.slots.try_lock().map(|s| s.len()).ok())
            .finish()
    }
}

impl<K, V> Default for InMemoryCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new(FixedTtl::ONE_HOUR)
    }
}

impl<K, V> InMemoryCache<K, V>
where
    K: Eq + Hash,
{
    /// Create a new empty cache governed by `policy`.
    #[must_use]
    pub fn new(policy: impl ExpiryPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Create a new empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(FixedTtl(ttl))
    }

    /// Number of keys holding a value, fresh or not.
    ///
    /// Keys with a fetch in flight are not counted.
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = self.slots.lock().await.values().cloned().collect();
        slots
            .iter()
            .filter(|slot| slot.try_lock().is_ok_and(|entry| entry.is_some()))
            .count()
    }

    /// Returns true if no key holds a value.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<K, V> InMemoryCache<K, V>
where
    K: Clone + Eq + Hash,
{
    async fn slot(&self, key: &K) -> Slot<V> {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for InMemoryCache<K, V>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    #[instrument(skip(self))]
    async fn get(&self, key: &K) -> Option<V> {
        let slot = self.slots.lock().await.get(key).cloned()?;
        let entry = slot.lock().await;
        match entry.as_ref() {
            Some(entry) if !entry.is_stale(self.policy.as_ref()) => {
                debug!("Cache hit");
                Some(entry.data.clone())
            }
            _ => {
                debug!("Cache miss");
                None
            }
        }
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: K, value: V) {
        let slot = self.slot(&key).await;
        *slot.lock().await = Some(CacheEntry::new(value));
        debug!("Cached value");
    }

    #[instrument(skip(self, fetch))]
    async fn get_or_fetch<'a>(&'a self, key: K, fetch: BoxFuture<'a, Result<V>>) -> Result<V> {
        let slot = self.slot(&key).await;
        let mut entry = slot.lock().await;

        match entry.as_ref() {
            Some(cached) if !cached.is_stale(self.policy.as_ref()) => {
                debug!("Cache hit");
                return Ok(cached.data.clone());
            }
            Some(_) => debug!("Cache entry expired, refetching"),
            None => debug!("Cache miss, fetching"),
        }

        let value = fetch.await?;
        *entry = Some(CacheEntry::new(value.clone()));
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self) -> usize {
        let policy = Arc::clone(&self.policy);
        let mut slots = self.slots.lock().await;
        let before = slots.len();

        // Slots locked by an in-flight fetch are kept.
        slots.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry
                .as_ref()
                .is_some_and(|e| !e.is_stale(policy.as_ref())),
            Err(_) => true,
        });

        let removed = before - slots.len();
        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }
        removed
    }

    #[instrument(skip(self))]
    async fn clear(&self) {
        self.slots.lock().await.clear();
        debug!("Cleared all cache entries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{NeverExpire, StatementsError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(calls: &AtomicUsize, value: u32) -> Result<u32> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(value)
    }

    #[tokio::test]
    async fn test_memory_cache_get_put() {
        let cache = InMemoryCache::<String, u32>::default();

        assert!(cache.get(&"2024q1".to_string()).await.is_none());

        cache.put("2024q1".to_string(), 42).await;
        assert_eq!(cache.get(&"2024q1".to_string()).await, Some(42));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let cache = InMemoryCache::<String, u32>::new(NeverExpire);
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("k".to_string(), Box::pin(counted(&calls, 7)))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch("k".to_string(), Box::pin(counted(&calls, 8)))
            .await
            .unwrap();

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overlapping_fetches_coalesce() {
        let cache = InMemoryCache::<String, u32>::default();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k".to_string(), Box::pin(counted(&calls, 1))),
            cache.get_or_fetch("k".to_string(), Box::pin(counted(&calls, 2))),
        );

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache = InMemoryCache::<String, u32>::with_ttl(Duration::ZERO);
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch("k".to_string(), Box::pin(counted(&calls, 1)))
            .await
            .unwrap();
        let value = cache
            .get_or_fetch("k".to_string(), Box::pin(counted(&calls, 2)))
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.get(&"k".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = InMemoryCache::<String, u32>::default();
        let calls = AtomicUsize::new(0);

        let failed = cache
            .get_or_fetch(
                "k".to_string(),
                Box::pin(async {
                    Err::<u32, _>(StatementsError::SourceUnavailable("timeout".to_string()))
                }),
            )
            .await;
        assert!(matches!(failed, Err(StatementsError::SourceUnavailable(_))));

        let value = cache
            .get_or_fetch("k".to_string(), Box::pin(counted(&calls, 3)))
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_in_flight_fetch_does_not_block_other_keys() {
        let cache = InMemoryCache::<String, u32>::default();
        let (release, released) = tokio::sync::oneshot::channel::<()>();

        let slow = cache.get_or_fetch(
            "slow".to_string(),
            Box::pin(async move {
                released.await.ok();
                Ok::<u32, StatementsError>(1)
            }),
        );
        let others = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let len = tokio::time::timeout(Duration::from_secs(1), cache.len())
                .await
                .unwrap();
            tokio::time::timeout(Duration::from_secs(1), cache.put("b".to_string(), 2))
                .await
                .unwrap();
            release.send(()).unwrap();
            len
        };

        let (slow, len) = tokio::join!(slow, others);
        assert_eq!(slow.unwrap(), 1);
        assert_eq!(len, 0);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_invalidate_stale_and_clear() {
        let stale = InMemoryCache::<String, u32>::with_ttl(Duration::ZERO);
        stale.put("a".to_string(), 1).await;
        stale.put("b".to_string(), 2).await;
        assert_eq!(stale.invalidate_stale().await, 2);
        assert!(stale.is_empty().await);

        let fresh = InMemoryCache::<String, u32>::default();
        fresh.put("a".to_string(), 1).await;
        assert_eq!(fresh.invalidate_stale().await, 0);
        fresh.clear().await;
        assert!(fresh.get(&"a".to_string()).await.is_none());
    }
}
