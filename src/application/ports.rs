use async_trait::async_trait;

use crate::domain::OpenNotification;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("store unavailable")]
    StoreUnavailable,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("notifier error: {0}")]
    Notifier(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Plain string get/set, no TTL.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// Deliver notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &OpenNotification) -> AppResult<()>;
}
