//! In-memory cache provider backed by DashMap.

use super::ZoneCache;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

struct Entry<T> {
    value: T,
    expires_at: Option<Instant>,
}

impl<T> Entry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Process-local TTL cache. Values are stored directly, so no
/// serialization bound is imposed on `T`.
///
/// Expiry is enforced lazily: an expired entry is evicted the first
/// time it is read. [`MemoryCache::purge_expired`] exists for callers
/// that want to reclaim memory for keys nobody reads again.
pub struct MemoryCache<T> {
    entries: DashMap<String, Entry<T>>,
}

impl<T> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sweep out every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
    }
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> ZoneCache<T> for MemoryCache<T>
where
    T: Clone + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<T> {
        // Check expiry without holding the shard guard across the
        // remove call below.
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(Instant::now()),
            None => return None,
        };

        if expired {
            self.entries.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: T, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    async fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".to_string(), Some(Duration::from_secs(1)))
            .await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        tokio::time::advance(Duration::from_millis(1_100)).await;
        assert_eq!(cache.get("k").await, None);
        // The expired read evicted the entry.
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_without_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache.set("k", 42u64, None).await;

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(cache.get("k").await, Some(42));
    }

    #[tokio::test]
    async fn delete_then_get_is_absent() {
        let cache = MemoryCache::new();
        cache.set("k", 1u32, None).await;
        assert!(cache.delete("k").await);
        assert!(!cache.delete("k").await);
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = MemoryCache::new();
        cache.set("a", 1u32, None).await;
        cache.set("b", 2u32, None).await;
        cache.clear().await;
        assert!(cache.is_empty());
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_sweeps_only_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("short", 1u32, Some(Duration::from_secs(1))).await;
        cache.set("long", 2u32, Some(Duration::from_secs(60))).await;
        cache.set("forever", 3u32, None).await;

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.purge_expired();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("long").await, Some(2));
        assert_eq!(cache.get("forever").await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_resets_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", 1u32, Some(Duration::from_secs(1))).await;
        tokio::time::advance(Duration::from_millis(900)).await;
        cache.set("k", 2u32, Some(Duration::from_secs(1))).await;
        tokio::time::advance(Duration::from_millis(900)).await;

        assert_eq!(cache.get("k").await, Some(2));
    }
}
