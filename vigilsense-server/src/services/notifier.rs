use async_trait::async_trait;
use serde_json::json;

use crate::configs::Notifier as NotifierSettings;
use crate::error::Error;

/// Notification collaborator. Any non-success outcome is a uniform failure;
/// the caller decides what a dropped message means.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), Error>;
}

/// Telegram Bot API client.
pub struct TelegramNotifier {
    client: reqwest::Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(settings: &NotifierSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "https://api.telegram.org/bot{}/sendMessage",
                settings.bot_token
            ),
            chat_id: settings.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), Error> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| Error::Notifier(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Notifier(format!(
                "telegram returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
