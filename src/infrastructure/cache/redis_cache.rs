//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, CachedEntry};
use crate::domain::entities::Entry;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

const KEY_PREFIX: &str = "entry:";

/// Redis cache for redirect lookups.
///
/// Values are JSON-encoded [`CachedEntry`] records under `entry:{id}`.
/// All operations are fail-open: errors are logged and reported as misses.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Opens a managed connection and checks it with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] naming the step that failed.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let failed = |step: &str, e: redis::RedisError| {
            CacheError::ConnectionError(format!("{step}: {e}"))
        };

        let client = Client::open(redis_url).map_err(|e| failed("invalid Redis URL", e))?;
        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| failed("Redis connection failed", e))?;
        conn.ping::<()>()
            .await
            .map_err(|e| failed("Redis PING failed", e))?;

        info!("Connected to Redis");
        Ok(Self { conn })
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_entry(&self, id: &str) -> CacheResult<Option<CachedEntry>> {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(Self::key(id)).await {
            Ok(Some(raw)) => match serde_json::from_str::<CachedEntry>(&raw) {
                Ok(cached) => {
                    debug!(id, "Cache hit");
                    Ok(Some(cached))
                }
                Err(e) => {
                    warn!(id, error = %e, "Discarding undecodable cache value");
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!(id, "Cache miss");
                Ok(None)
            }
            Err(e) => {
                error!(id, error = %e, "Redis GET error");
                Ok(None)
            }
        }
    }

    async fn set_entry(&self, entry: &Entry, ttl_seconds: u64) -> CacheResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let value = serde_json::to_string(&CachedEntry::from(entry))
            .map_err(|e| CacheError::OperationError(e.to_string()))?;
        let mut conn = self.conn.clone();

        match conn
            .set_ex::<_, _, ()>(Self::key(&entry.id), value, ttl_seconds)
            .await
        {
            Ok(_) => {
                debug!(id = %entry.id, ttl_seconds, "Cached redirect");
                Ok(())
            }
            Err(e) => {
                warn!(id = %entry.id, error = %e, "Redis SET error");
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }
}
