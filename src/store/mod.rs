//! Store access for export runs
//!
//! [`KeyStore`] is the only surface the export pipeline touches: a type query,
//! one bulk read per value type and a cursor-based scan. [`RedisStore`] backs
//! it with a multiplexed Redis connection whose response timeout is fixed when
//! the connection is opened.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::trace;

use crate::error::Result;

/// Operations the exporter needs from a key-value store
#[async_trait]
pub trait KeyStore: Send {
    /// Raw `TYPE` reply for a key (`none` when the key no longer exists)
    async fn key_type(&mut self, key: &str) -> Result<String>;

    /// String value, `None` when the key has no value
    async fn get_string(&mut self, key: &str) -> Result<Option<String>>;

    /// Every list element in store order
    async fn get_list(&mut self, key: &str) -> Result<Vec<String>>;

    /// Every set member, in store iteration order
    async fn get_set(&mut self, key: &str) -> Result<Vec<String>>;

    /// Every sorted set member with its score, ascending by rank
    async fn get_sorted_set(&mut self, key: &str) -> Result<Vec<(String, f64)>>;

    /// Every hash field and value
    async fn get_hash(&mut self, key: &str) -> Result<Vec<(String, String)>>;

    /// One SCAN step: returns the next cursor (0 when done) and a batch of keys
    async fn scan(&mut self, cursor: u64, pattern: &str, count: usize)
    -> Result<(u64, Vec<String>)>;

    /// Number of keys in the selected database
    async fn key_count(&mut self) -> Result<u64>;
}

/// [`KeyStore`] backed by a Redis connection
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Wrap an already authenticated connection with the database selected
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn key_type(&mut self, key: &str) -> Result<String> {
        let kind: String = redis::cmd("TYPE").arg(key).query_async(&mut self.conn).await?;
        trace!("TYPE {} -> {}", key, kind);
        Ok(kind)
    }

    async fn get_string(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut self.conn).await?;
        Ok(value)
    }

    async fn get_list(&mut self, key: &str) -> Result<Vec<String>> {
        let items: Vec<String> = redis::cmd("LRANGE")
            .arg(key)
            .arg(0)
            .arg(-1)
            .query_async(&mut self.conn)
            .await?;
        Ok(items)
    }

    async fn get_set(&mut self, key: &str) -> Result<Vec<String>> {
        let members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(key)
            .query_async(&mut self.conn)
            .await?;
        Ok(members)
    }

    async fn get_sorted_set(&mut self, key: &str) -> Result<Vec<(String, f64)>> {
        let members: Vec<(String, f64)> = redis::cmd("ZRANGE")
            .arg(key)
            .arg(0)
            .arg(-1)
            .arg("WITHSCORES")
            .query_async(&mut self.conn)
            .await?;
        Ok(members)
    }

    async fn get_hash(&mut self, key: &str) -> Result<Vec<(String, String)>> {
        let fields: Vec<(String, String)> = redis::cmd("HGETALL")
            .arg(key)
            .query_async(&mut self.conn)
            .await?;
        Ok(fields)
    }

    async fn scan(
        &mut self,
        cursor: u64,
        pattern: &str,
        count: usize,
    ) -> Result<(u64, Vec<String>)> {
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut self.conn)
            .await?;
        trace!("SCAN {} -> next {} ({} keys)", cursor, next, keys.len());
        Ok((next, keys))
    }

    async fn key_count(&mut self) -> Result<u64> {
        let count: u64 = redis::cmd("DBSIZE").query_async(&mut self.conn).await?;
        Ok(count)
    }
}
