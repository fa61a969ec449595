//! Cache trait for fetched SEC payloads.
//!
//! This module defines the [`Cache`] trait used for the ticker table and the
//! quarterly datasets, together with the [`ExpiryPolicy`] that decides how long
//! an entry stays valid.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use crate::error::Result;

/// Decides whether a cached entry of a given age must be refetched.
pub trait ExpiryPolicy: Send + Sync + Debug {
    /// Returns true if an entry fetched `age` ago is no longer valid.
    fn is_expired(&self, age: Duration) -> bool;
}

/// Entries expire after a fixed time-to-live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedTtl(pub Duration);

impl FixedTtl {
    /// One hour, the default lifetime for SEC payloads.
    pub const ONE_HOUR: Self = Self(Duration::from_secs(60 * 60));
}

impl Default for FixedTtl {
    fn default() -> Self {
        Self::ONE_HOUR
    }
}

impl ExpiryPolicy for FixedTtl {
    fn is_expired(&self, age: Duration) -> bool {
        age >= self.0
    }
}

/// Entries never expire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeverExpire;

impl ExpiryPolicy for NeverExpire {
    fn is_expired(&self, _age: Duration) -> bool {
        false
    }
}

/// Keyed cache of fetched values.
///
/// Implementations can store data in various backends to avoid repeated
/// downloads of slow-changing SEC payloads.
#[async_trait]
pub trait Cache<K, V>: Send + Sync + Debug
where
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Returns the cached value for `key` if present and not expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores a value, replacing any previous entry.
    async fn put(&self, key: K, value: V);

    /// Returns the cached value for `key`, or drives `fetch` and caches its result.
    ///
    /// Callers racing on the same key observe a single fetch. Errors are
    /// returned to the caller and never cached.
    async fn get_or_fetch<'a>(&'a self, key: K, fetch: BoxFuture<'a, Result<V>>) -> Result<V>;

    /// Removes expired entries.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self) -> usize;

    /// Clears all cached data.
    async fn clear(&self);
}
