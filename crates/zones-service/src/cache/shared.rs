//! Shared cache provider backed by Redis.
//!
//! Values are stored as JSON under a namespace prefix so `clear` can
//! scope itself to this cache's keys. Every I/O or decode failure is
//! logged and reported as a miss; callers fall back to authoritative
//! computation and the request only pays latency.

use super::ZoneCache;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;

const DEFAULT_NAMESPACE: &str = "zones";
const SCAN_BATCH: usize = 100;

pub struct SharedCache<T> {
    conn: ConnectionManager,
    namespace: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> SharedCache<T> {
    /// Connect to a Redis endpoint, e.g. `redis://localhost:6379`.
    /// Connection failure here is fatal; once connected, the manager
    /// reconnects on its own.
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            namespace: DEFAULT_NAMESPACE.to_string(),
            _value: PhantomData,
        })
    }

    /// Scope this cache's keys under a different prefix.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl<T> ZoneCache<T> for SharedCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(self.namespaced(key)).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%err, key, "shared cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(%err, key, "shared cache payload undecodable, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: T, ttl: Option<Duration>) {
        let payload = match serde_json::to_string(&value) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%err, key, "shared cache value unserializable, skipping write");
                return;
            }
        };

        let namespaced = self.namespaced(key);
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = match ttl {
            Some(ttl) => conn.set_ex(&namespaced, payload, ttl.as_secs().max(1)).await,
            None => conn.set(&namespaced, payload).await,
        };
        if let Err(err) = result {
            tracing::warn!(%err, key, "shared cache write failed");
        }
    }

    async fn delete(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        match conn.del::<_, i64>(self.namespaced(key)).await {
            Ok(removed) => removed > 0,
            Err(err) => {
                tracing::warn!(%err, key, "shared cache delete failed");
                false
            }
        }
    }

    async fn clear(&self) {
        let mut conn = self.conn.clone();
        let pattern = format!("{}:*", self.namespace);
        let mut cursor: u64 = 0;

        loop {
            let reply: redis::RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await;

            let (next, keys) = match reply {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::warn!(%err, "shared cache clear scan failed");
                    return;
                }
            };

            if !keys.is_empty() {
                // One multi-key DEL per batch: the batch lands atomically
                // instead of key-by-key.
                if let Err(err) = conn.del::<_, i64>(keys).await {
                    tracing::warn!(%err, "shared cache clear delete failed");
                    return;
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }
    }
}
