//! Redis Revocation Store
//!
//! Backs the `RT:` and `BL:` namespaces with native key expiry, so dead
//! entries vanish without any sweeper process.

use std::fmt;
use std::time::Duration;

use redis::{AsyncCommands, aio::ConnectionManager};

use crate::domain::repository::RevocationStore;
use crate::error::IdentityResult;

/// Redis-backed expiring key-value store
///
/// `ConnectionManager` multiplexes one connection and reconnects on
/// failure; cloning it is cheap, which lets trait methods take `&self`.
#[derive(Clone)]
pub struct RedisRevocationStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisRevocationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRevocationStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisRevocationStore {
    pub async fn new(redis_url: &str) -> IdentityResult<Self> {
        tracing::info!(url = %redis_url, "Connecting to revocation store");

        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        tracing::info!("Revocation store connected");

        Ok(Self { conn })
    }
}

impl RevocationStore for RedisRevocationStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> IdentityResult<()> {
        let mut conn = self.conn.clone();

        // PSETEX rejects a zero TTL; clamp to the shortest expiry instead
        let ttl_ms = (ttl.as_millis() as u64).max(1);
        conn.pset_ex::<_, _, ()>(key, value, ttl_ms).await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> IdentityResult<Option<String>> {
        let mut conn = self.conn.clone();

        let value: Option<String> = conn.get(key).await?;

        Ok(value)
    }

    async fn delete(&self, key: &str) -> IdentityResult<()> {
        let mut conn = self.conn.clone();

        // DEL on an absent key is a no-op, which gives delete its
        // idempotency for free
        conn.del::<_, ()>(key).await?;

        Ok(())
    }
}
