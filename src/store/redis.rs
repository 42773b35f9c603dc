//! `RawKv` backed by Redis. Grounded on `internal/db/redis.go`'s
//! `RedisDataManager`, minus the encryption (handled generically one layer
//! up by `EncryptedStore`) and the per-kind key prefixes (also handled by
//! the caller, not this transport).

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

use super::RawKv;
use crate::error::{ProxyError, Result};

pub struct RedisKv {
    conn: ConnectionManager,
}

impl RedisKv {
    pub async fn connect(conn_str: &str) -> Result<Self> {
        let client = redis::Client::open(conn_str)
            .map_err(|e| ProxyError::Store(format!("parse redis URL: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| ProxyError::Store(format!("connect redis: {e}")))?;
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl RawKv for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| ProxyError::Store(format!("redis get: {e}")))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs())
                .await
                .map_err(|e| ProxyError::Store(format!("redis set_ex: {e}"))),
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| ProxyError::Store(format!("redis set: {e}"))),
        }
    }
}
