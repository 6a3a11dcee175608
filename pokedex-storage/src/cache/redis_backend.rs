//! Redis cache backend.
//!
//! Uses a multiplexed `ConnectionManager`, which reconnects on its own after
//! the server drops the connection. Only the initial connect is bounded
//! here; per-command deadlines belong to the adapter.

use std::time::Duration;

use async_trait::async_trait;
use pokedex_core::CacheError;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError};

use super::traits::CacheBackend;

/// Cache backend talking to a Redis server.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
    endpoint: String,
}

impl std::fmt::Debug for RedisCacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheBackend")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RedisCacheBackend {
    /// Open a connection, giving up after `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self, CacheError> {
        let endpoint = redact_url(url);

        let client = redis::Client::open(url).map_err(|e| CacheError::Connection {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Connection {
                endpoint: endpoint.clone(),
                reason: format!("no connection after {}ms", connect_timeout.as_millis()),
            })?
            .map_err(|e| CacheError::Connection {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(endpoint = %endpoint, "Connected to Redis cache");
        Ok(Self { conn, endpoint })
    }

    fn classify(&self, err: RedisError) -> CacheError {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            CacheError::Connection {
                endpoint: self.endpoint.clone(),
                reason: err.to_string(),
            }
        } else {
            CacheError::Command {
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let result = match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };
        result.map_err(|e| self.classify(e))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| self.classify(e))?;

        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::Command {
                reason: format!("unexpected PING reply: {}", pong),
            })
        }
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Strip credentials from a Redis URL for logging.
pub(crate) fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.rsplit_once('@') {
        Some((_, host)) => format!("{}://***@{}", scheme, host),
        None => url.to_string(),
    }
}
