use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use crate::application::{AppError, AppResult, Notifier};
use crate::domain::OpenNotification;

pub const DEFAULT_NTFY_BASE_URL: &str = "https://ntfy.sh";
pub const DEFAULT_NTFY_TIMEOUT: Duration = Duration::from_secs(3);

/// Publishes plain-text messages to an ntfy topic.
pub struct NtfyNotifier {
    client: reqwest::Client,
    base_url: String,
    topic: String,
    timeout: Duration,
}

impl NtfyNotifier {
    pub fn new(topic: String) -> Self {
        Self::with_base_url(DEFAULT_NTFY_BASE_URL, topic)
    }

    pub fn with_base_url(base_url: impl Into<String>, topic: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            topic,
            timeout: DEFAULT_NTFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn topic_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.topic)
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn notify(&self, notification: &OpenNotification) -> AppResult<()> {
        if self.topic.is_empty() {
            return Err(AppError::Config("NTFY_TOPIC not set".into()));
        }

        let title = header_text(&notification.headline())?;

        let resp = self
            .client
            .post(self.topic_url())
            .header("Title", title)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header("Tags", notification.kind.tag())
            .timeout(self.timeout)
            .body(notification.message())
            .send()
            .await
            .map_err(|e| AppError::Notifier(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Notifier(format!(
                "ntfy returned {status}: {}",
                body.trim()
            )));
        }

        Ok(())
    }
}

/// Header values must be visible ASCII; anything else goes out RFC 2047
/// encoded, which ntfy decodes.
fn header_text(text: &str) -> AppResult<HeaderValue> {
    // from_str lets obs-text (0x80..=0xff) through, so check the bytes first
    if text.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b)) {
        return HeaderValue::from_str(text).map_err(|e| AppError::Notifier(e.to_string()));
    }
    let encoded = format!("=?UTF-8?B?{}?=", STANDARD.encode(text));
    HeaderValue::from_str(&encoded).map_err(|e| AppError::Notifier(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_titles_pass_through() {
        let value = header_text("Q3 report: First Open").unwrap();
        assert_eq!(value.to_str().unwrap(), "Q3 report: First Open");
    }

    #[test]
    fn non_ascii_titles_are_encoded() {
        let value = header_text("Café: Reopened").unwrap();
        assert_eq!(value.to_str().unwrap(), "=?UTF-8?B?Q2Fmw6k6IFJlb3BlbmVk?=");
    }

    #[test]
    fn control_characters_are_encoded() {
        let value = header_text("line\nbreak").unwrap();
        assert!(value.to_str().unwrap().starts_with("=?UTF-8?B?"));
    }

    #[test]
    fn topic_url_joins_cleanly() {
        let n = NtfyNotifier::with_base_url("http://localhost:8080/", "mail".into());
        assert_eq!(n.topic_url(), "http://localhost:8080/mail");
    }
}
