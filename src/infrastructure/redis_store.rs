use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tokio::sync::OnceCell;

use crate::application::{AppError, AppResult, KeyValueStore};

/// Tracking records in Redis, one string key per tracked email.
///
/// The connection is opened on first use. A failed attempt is not cached,
/// so a Redis that comes up after the service is picked up by the next
/// request.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    config: ConnectionManagerConfig,
    conn: Arc<OnceCell<ConnectionManager>>,
}

impl RedisStore {
    /// Parses the url without connecting.
    ///
    /// url examples
    /// - "redis://127.0.0.1:6379"
    /// - "rediss://default:<password>@host:6379" (TLS, e.g. hosted Redis)
    pub fn new(redis_url: &str) -> AppResult<Self> {
        let client = Client::open(redis_url).map_err(|e| AppError::Storage(e.to_string()))?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_secs(2));

        Ok(Self {
            client,
            config,
            conn: Arc::new(OnceCell::new()),
        })
    }

    /// `new` plus an immediate connection attempt.
    pub async fn connect(redis_url: &str) -> AppResult<Self> {
        let store = Self::new(redis_url)?;
        store.warm_up().await?;
        Ok(store)
    }

    /// Opens the connection now instead of on the first request.
    pub async fn warm_up(&self) -> AppResult<()> {
        self.connection().await.map(|_| ())
    }

    pub fn is_connected(&self) -> bool {
        self.conn.initialized()
    }

    async fn connection(&self) -> AppResult<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                self.client
                    .get_connection_manager_with_config(self.config.clone())
                    .await
            })
            .await
            .map_err(|e| AppError::Storage(format!("redis unreachable: {e}")))?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}
