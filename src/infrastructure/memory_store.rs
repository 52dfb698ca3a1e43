use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{AppError, AppResult, KeyValueStore};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        Ok(inner.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| AppError::Storage("lock poisoned".into()))?;
        inner.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stand-in when no store is configured or the initial connection failed.
/// Every open then looks like a first sighting and nothing is persisted.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledStore;

#[async_trait]
impl KeyValueStore for DisabledStore {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::StoreUnavailable)
    }

    async fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::StoreUnavailable)
    }
}
