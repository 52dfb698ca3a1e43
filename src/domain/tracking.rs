use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Human readable timestamp used in `first_open` and in notification bodies.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Persisted state for one tracked email, stored as JSON under
/// [`TrackedEmail::store_key`](super::TrackedEmail::store_key).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub first_open: String,
    /// Opens counted after activation.
    pub count: u32,
    #[serde(with = "rfc3339")]
    pub activation_time: DateTime<Utc>,
}

impl TrackingRecord {
    /// Record for the first sighting of an email. Opens are ignored until
    /// `now + delay`.
    pub fn activate(now: DateTime<Utc>, delay: TimeDelta) -> Self {
        Self {
            first_open: format_timestamp(now),
            count: 0,
            activation_time: now + delay,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.activation_time
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// `+00:00` offset with microseconds on write; any RFC 3339 offset on read.
mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
