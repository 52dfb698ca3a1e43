use async_trait::async_trait;

use crate::application::{AppError, AppResult, Notifier};
use crate::domain::OpenNotification;

/// Sends every notification to each named channel in turn.
#[derive(Default)]
pub struct MultiNotifier {
    channels: Vec<(&'static str, Box<dyn Notifier>)>,
}

impl MultiNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, name: &'static str, notifier: impl Notifier + 'static) -> Self {
        self.channels.push((name, Box::new(notifier)));
        self
    }

    pub fn channels(&self) -> Vec<&'static str> {
        self.channels.iter().map(|(name, _)| *name).collect()
    }
}

#[async_trait]
impl Notifier for MultiNotifier {
    /// A failing channel does not stop the rest. One failure is returned as
    /// is; several are folded into a single `Notifier` error naming each.
    async fn notify(&self, notification: &OpenNotification) -> AppResult<()> {
        let mut failed: Vec<(&'static str, AppError)> = Vec::new();

        for (name, channel) in &self.channels {
            match channel.notify(notification).await {
                Ok(()) => {}
                Err(e @ AppError::Config(_)) => {
                    tracing::debug!(channel = *name, "channel not configured: {e}");
                    failed.push((*name, e));
                }
                Err(e) => {
                    tracing::warn!(channel = *name, "notification channel failed: {e}");
                    failed.push((*name, e));
                }
            }
        }

        match failed.len() {
            0 => Ok(()),
            1 => Err(failed.remove(0).1),
            _ => Err(AppError::Notifier(
                failed
                    .iter()
                    .map(|(name, e)| format!("{name}: {e}"))
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }
}
