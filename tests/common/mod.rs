#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mailpulse::application::{AppError, AppResult, KeyValueStore, Notifier};
use mailpulse::domain::OpenNotification;
use mailpulse::infrastructure::memory_store::InMemoryStore;

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<OpenNotification>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the notification, then reports a transport failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OpenNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &OpenNotification) -> AppResult<()> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(AppError::Notifier("connection refused".into()));
        }
        Ok(())
    }
}

/// In-memory store that counts how often it was touched.
#[derive(Clone, Default)]
pub struct SpyStore {
    pub inner: InMemoryStore,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
}

impl SpyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> (usize, usize) {
        (
            self.gets.load(Ordering::SeqCst),
            self.sets.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl KeyValueStore for SpyStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}

/// Behaves like a Redis whose connection dropped.
pub struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::Storage("connection reset by peer".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Storage("connection reset by peer".into()))
    }
}
