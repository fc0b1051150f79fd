use async_trait::async_trait;
use deadpool_redis::redis::{cmd, AsyncCommands, RedisError};
use deadpool_redis::{Config, Connection, Pool, PoolConfig, PoolError, Runtime};
use shortlink_core::repository::Result;
use shortlink_core::{Mapping, MappingRepository, ShortCode, StorageError, KEY_PREFIX};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Keys fetched per SCAN round trip when clearing the namespace.
const SCAN_BATCH: usize = 100;

/// Deletes `KEYS[1]` only while its payload still names short code `ARGV[1]`.
const RELEASE_URL_SCRIPT: &str = r#"
local payload = redis.call('GET', KEYS[1])
if not payload then
  return 0
end
local ok, stored = pcall(cjson.decode, payload)
if ok and type(stored) == 'table' and stored['short_code'] == ARGV[1] then
  return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Redis implementation of the mapping repository.
///
/// A single long-lived connection pool is shared by every request; each
/// operation checks a connection out and returns it when the guard drops.
/// Payloads are the JSON form of [`Mapping`], written under
/// `url_mapping:url:<url>` and `url_mapping:code:<code>`.
#[derive(Clone)]
pub struct RedisRepository {
    pool: Pool,
}

impl std::fmt::Debug for RedisRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRepository")
            .field("status", &self.pool.status())
            .finish()
    }
}

fn map_redis_error(operation: &str, err: RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StorageError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

fn map_pool_error(operation: &str, err: PoolError) -> StorageError {
    match err {
        PoolError::Backend(err) => map_redis_error(operation, err),
        timeout @ PoolError::Timeout(_) => StorageError::Timeout(format!("{operation}: {timeout}")),
        other => StorageError::Unavailable(format!("{operation}: {other}")),
    }
}

impl RedisRepository {
    /// Creates a repository from an existing connection pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a repository by building a connection pool for `redis_url`.
    ///
    /// No connection is opened until the first operation.
    pub fn connect(redis_url: &str, max_size: usize) -> Result<Self> {
        let mut config = Config::from_url(redis_url);
        config.pool = Some(PoolConfig::new(max_size));
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StorageError::Unavailable(format!("failed to create pool: {e}")))?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| map_pool_error("failed to get connection", e))
    }

    /// `SET key value NX EX ttl`; `false` when the key is already taken.
    async fn set_if_absent(&self, key: &str, mapping: &Mapping, ttl: Duration) -> Result<bool> {
        let json = encode(mapping)?;

        let mut conn = self.conn().await?;
        let reply: Option<String> = cmd("SET")
            .arg(key)
            .arg(json)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to write key to Redis", e))?;
        Ok(reply.is_some())
    }

    async fn read(&self, key: &str) -> Result<Option<Mapping>> {
        let mut conn = self.conn().await?;
        let payload: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| map_redis_error("failed to fetch value from Redis", e))?;

        match payload {
            Some(payload) => serde_json::from_str(&payload).map(Some).map_err(|e| {
                warn!(key, error = %e, "Failed to deserialize stored mapping");
                StorageError::InvalidData(format!("invalid value for key '{key}': {e}"))
            }),
            None => Ok(None),
        }
    }
}

fn encode(mapping: &Mapping) -> Result<String> {
    serde_json::to_string(mapping)
        .map_err(|e| StorageError::Operation(format!("failed to serialize mapping: {e}")))
}

#[async_trait]
impl MappingRepository for RedisRepository {
    async fn find_by_url(&self, url: &str) -> Result<Option<Mapping>> {
        trace!(url, "Fetching mapping by url");
        self.read(&Mapping::url_key(url)).await
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        trace!(code = %code, "Fetching mapping by code");
        self.read(&Mapping::code_key(code)).await
    }

    async fn code_exists(&self, code: &ShortCode) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.exists(Mapping::code_key(code))
            .await
            .map_err(|e| map_redis_error("failed to check key in Redis", e))
    }

    async fn insert_url_if_absent(&self, mapping: &Mapping, ttl: Duration) -> Result<bool> {
        let inserted = self
            .set_if_absent(&Mapping::url_key(&mapping.original_url), mapping, ttl)
            .await?;
        debug!(url = %mapping.original_url, inserted, "Conditional write of url key");
        Ok(inserted)
    }

    async fn insert_code_if_absent(&self, mapping: &Mapping, ttl: Duration) -> Result<bool> {
        let inserted = self
            .set_if_absent(&Mapping::code_key(&mapping.short_code), mapping, ttl)
            .await?;
        debug!(code = %mapping.short_code, inserted, "Conditional write of code key");
        Ok(inserted)
    }

    async fn release_url(&self, mapping: &Mapping) -> Result<bool> {
        let mut conn = self.conn().await?;
        let deleted: i64 = cmd("EVAL")
            .arg(RELEASE_URL_SCRIPT)
            .arg(1)
            .arg(Mapping::url_key(&mapping.original_url))
            .arg(mapping.short_code.as_str())
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to release url key in Redis", e))?;

        debug!(url = %mapping.original_url, code = %mapping.short_code, deleted, "Released url key");
        Ok(deleted > 0)
    }

    async fn update_code(&self, mapping: &Mapping) -> Result<()> {
        let json = encode(mapping)?;

        let mut conn = self.conn().await?;
        let reply: Option<String> = cmd("SET")
            .arg(Mapping::code_key(&mapping.short_code))
            .arg(json)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to update code key in Redis", e))?;

        if reply.is_none() {
            debug!(code = %mapping.short_code, "Code key vanished before update");
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: String = cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to ping Redis", e))?;
        Ok(())
    }

    async fn clear(&self) -> Result<u64> {
        let pattern = format!("{KEY_PREFIX}*");
        let mut conn = self.conn().await?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| map_redis_error("failed to scan keys in Redis", e))?;

            if !keys.is_empty() {
                let removed: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| map_redis_error("failed to delete keys in Redis", e))?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(deleted, "Cleared mapping namespace");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_builds_lazy_pool() {
        // Building the pool must not dial Redis.
        let repo = RedisRepository::connect("redis://127.0.0.1:1", 4).unwrap();
        assert_eq!(repo.pool().status().max_size, 4);
    }

    #[test]
    fn connect_rejects_malformed_url() {
        assert!(RedisRepository::connect("not a url", 4).is_err());
    }
}
