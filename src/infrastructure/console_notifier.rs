use async_trait::async_trait;

use crate::application::{AppResult, Notifier};
use crate::domain::OpenNotification;

pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notification: &OpenNotification) -> AppResult<()> {
        println!(
            "NOTIFY: [{}] {} | {}",
            notification.kind.tag(),
            notification.headline(),
            notification.message().replace('\n', " | ")
        );
        Ok(())
    }
}
