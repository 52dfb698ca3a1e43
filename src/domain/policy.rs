use chrono::{DateTime, TimeDelta, Utc};

use super::TrackingRecord;

#[derive(Clone, Debug)]
pub struct ActivationPolicy {
    /// Grace period after the first sighting; covers preview panes and prefetchers.
    pub activation_delay: TimeDelta,
    /// Stored counts above this are no longer notified.
    pub notify_threshold: u32,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            activation_delay: TimeDelta::seconds(30),
            notify_threshold: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpenDecision {
    /// No record yet: create one and announce the tracker.
    Activate,
    /// Still inside the activation window.
    Pending { remaining: TimeDelta },
    /// Over the threshold; leave the record alone.
    Suppress { count: u32 },
    /// Count this open; `record` already carries the new count.
    Count { record: TrackingRecord },
}

impl ActivationPolicy {
    pub fn decide(&self, record: Option<TrackingRecord>, now: DateTime<Utc>) -> OpenDecision {
        let Some(mut record) = record else {
            return OpenDecision::Activate;
        };

        if !record.is_active_at(now) {
            return OpenDecision::Pending {
                remaining: record.activation_time - now,
            };
        }

        if record.count > self.notify_threshold {
            return OpenDecision::Suppress {
                count: record.count,
            };
        }

        record.count = record.count.saturating_add(1);
        OpenDecision::Count { record }
    }
}
