use std::fmt;

/// Placeholder used for any query parameter or header the request did not carry.
pub const UNKNOWN: &str = "unknown";

/// What the HTTP layer extracted from one pixel load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenRequest {
    pub recipient: String,
    pub title: String,
    pub ip: String,
}

impl OpenRequest {
    pub fn new(
        recipient: Option<String>,
        title: Option<String>,
        ip: Option<String>,
    ) -> Self {
        Self {
            recipient: recipient.unwrap_or_else(|| UNKNOWN.to_string()),
            title: title.unwrap_or_else(|| UNKNOWN.to_string()),
            ip: ip.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

/// A (recipient, title) pair that is worth tracking.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackedEmail {
    recipient: String,
    title: String,
}

impl TrackedEmail {
    pub fn parse(recipient: &str, title: &str) -> Result<Self, TrackedEmailError> {
        if recipient.is_empty() || recipient == UNKNOWN || title.is_empty() || title == UNKNOWN {
            return Err(TrackedEmailError::MissingParams {
                recipient: recipient.to_string(),
                title: title.to_string(),
            });
        }
        Ok(Self {
            recipient: recipient.to_string(),
            title: title.to_string(),
        })
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Store key, e.g. `email:alice@example.com:Q3 report`.
    ///
    /// Values are used verbatim, so a `:` inside either part can collide with
    /// another pair.
    pub fn store_key(&self) -> String {
        format!("email:{}:{}", self.recipient, self.title)
    }
}

impl fmt::Display for TrackedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.recipient, self.title)
    }
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum TrackedEmailError {
    #[error("missing recipient or title (recipient={recipient}, title={title})")]
    MissingParams { recipient: String, title: String },
}
