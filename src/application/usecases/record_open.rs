use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::application::{AppError, AppResult, KeyValueStore, Notifier};
use crate::domain::{
    ActivationPolicy, NotificationKind, OpenDecision, OpenNotification, OpenRequest,
    TrackedEmail, TrackingRecord,
};

/// What a single pixel load did to the tracking state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Recipient or title missing; nothing was looked up.
    Filtered,
    /// First sighting; an activation record was created.
    Activated,
    /// Inside the activation window; ignored.
    Pending { remaining: TimeDelta },
    /// Count above the notify threshold; ignored.
    Suppressed { count: u32 },
    /// Open counted; `count` is the new total.
    Counted { count: u32 },
}

/// Activation / counting state machine for one (recipient, title) pair.
///
/// Store and notifier failures are logged and absorbed here, so callers
/// always get an outcome back.
#[derive(Clone)]
pub struct RecordOpenUseCase {
    pub store: Arc<dyn KeyValueStore>,
    pub notifier: Arc<dyn Notifier>,
    pub policy: ActivationPolicy,
}

impl RecordOpenUseCase {
    pub async fn execute(&self, request: &OpenRequest, now: DateTime<Utc>) -> OpenOutcome {
        let email = match TrackedEmail::parse(&request.recipient, &request.title) {
            Ok(email) => email,
            Err(e) => {
                tracing::debug!("request filtered: {e}");
                return OpenOutcome::Filtered;
            }
        };

        let key = email.store_key();
        let existing = match self.load(&key).await {
            Ok(record) => {
                tracing::debug!(key = %key, ?record, "store GET");
                record
            }
            Err(AppError::StoreUnavailable) => {
                tracing::debug!(key = %key, "store unavailable, treating record as absent");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, "treating record as absent: {e}");
                None
            }
        };

        match self.policy.decide(existing, now) {
            OpenDecision::Activate => {
                let record = TrackingRecord::activate(now, self.policy.activation_delay);
                self.persist(&key, &record).await;
                tracing::info!(
                    key = %key,
                    activation_time = %record.activation_time.to_rfc3339(),
                    "zero open recorded"
                );
                self.send(&email, request, now, NotificationKind::TrackerActivated, 0)
                    .await;
                OpenOutcome::Activated
            }
            OpenDecision::Pending { remaining } => {
                tracing::info!(
                    key = %key,
                    remaining_secs = remaining.num_seconds(),
                    "not activated yet"
                );
                OpenOutcome::Pending { remaining }
            }
            OpenDecision::Suppress { count } => {
                tracing::info!(
                    key = %key,
                    count,
                    "open count exceeds threshold, skipping notification"
                );
                OpenOutcome::Suppressed { count }
            }
            OpenDecision::Count { record } => {
                let count = record.count;
                self.persist(&key, &record).await;
                self.send(&email, request, now, NotificationKind::for_count(count), count)
                    .await;
                OpenOutcome::Counted { count }
            }
        }
    }

    async fn load(&self, key: &str) -> AppResult<Option<TrackingRecord>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        TrackingRecord::from_json(&raw)
            .map(Some)
            .map_err(|e| AppError::Decode(e.to_string()))
    }

    async fn save(&self, key: &str, record: &TrackingRecord) -> AppResult<()> {
        let raw = record
            .to_json()
            .map_err(|e| AppError::Decode(e.to_string()))?;
        self.store.set(key, &raw).await
    }

    async fn persist(&self, key: &str, record: &TrackingRecord) {
        match self.save(key, record).await {
            Ok(()) => tracing::debug!(key, ?record, "store SET"),
            Err(AppError::StoreUnavailable) => {
                tracing::debug!(key, "store unavailable, skipping save");
            }
            Err(e) => tracing::error!(key, "store SET failed: {e}"),
        }
    }

    async fn send(
        &self,
        email: &TrackedEmail,
        request: &OpenRequest,
        now: DateTime<Utc>,
        kind: NotificationKind,
        count: u32,
    ) {
        let notification = OpenNotification {
            kind,
            recipient: email.recipient().to_string(),
            title: email.title().to_string(),
            ip: request.ip.clone(),
            count,
            opened_at: now,
        };

        match self.notifier.notify(&notification).await {
            Ok(()) => tracing::info!(kind = %kind, count, "notification sent"),
            Err(e @ AppError::Config(_)) => {
                tracing::warn!("skipping notification: {e}");
            }
            Err(e) => tracing::error!(kind = %kind, "failed to send notification: {e}"),
        }
    }
}
