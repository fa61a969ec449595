//! No-op cache implementation.

use async_trait::async_trait;
use futures::future::BoxFuture;
use statements_core::{Cache, Result};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::marker::PhantomData;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns `None`, `put` discards the value and `get_or_fetch`
/// always drives the fetch. Useful for disabling caching.
pub struct NoopCache<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> NoopCache<K, V> {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Default for NoopCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for NoopCache<K, V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<K, V> Debug for NoopCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoopCache")
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for NoopCache<K, V>
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, _key: &K) -> Option<V> {
        trace!("NoopCache: get called, returning None");
        None
    }

    async fn put(&self, _key: K, _value: V) {
        trace!("NoopCache: put called, doing nothing");
    }

    async fn get_or_fetch<'a>(&'a self, _key: K, fetch: BoxFuture<'a, Result<V>>) -> Result<V> {
        trace!("NoopCache: get_or_fetch called, fetching");
        fetch.await
    }

    async fn invalidate_stale(&self) -> usize {
        0
    }

    async fn clear(&self) {}
}
