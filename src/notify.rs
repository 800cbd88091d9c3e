//! Notification delivery through Telegram
//!
//! `Messenger` is the delivery seam; `TelegramMessenger` implements it
//! over the Bot API. `Notifier` wraps a messenger and reports delivery
//! success or failure without ever propagating an error: delivery
//! failure must never crash the poll loop.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{ReviewbotError, Result};

/// Telegram Bot API base URL
const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Delivery seam: send text to the configured destination
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Messenger implementation over the Telegram Bot API
pub struct TelegramMessenger {
    client: Client,
    send_url: String,
    chat_id: String,
}

impl TelegramMessenger {
    /// Create a messenger with an explicit request timeout
    ///
    /// The timeout bounds worst-case cycle latency; without it a stalled
    /// delivery would block the whole loop.
    pub fn new(
        token: impl AsRef<str>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReviewbotError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            send_url: format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, token.as_ref()),
            chat_id: chat_id.into(),
        })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.send_url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| ReviewbotError::Delivery(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ReviewbotError::Delivery(format!(
                "Telegram API error {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for TelegramMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramMessenger")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Sends composed messages and reports the outcome as a plain bool
pub struct Notifier {
    messenger: Box<dyn Messenger>,
}

impl Notifier {
    pub fn new(messenger: Box<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Attempt delivery; true on success, false on any failure
    ///
    /// Failures are logged with the attempted message and the cause.
    pub async fn notify(&self, text: &str) -> bool {
        match self.messenger.send(text).await {
            Ok(()) => {
                log::debug!("Delivered message: {}", text);
                true
            }
            Err(err) => {
                log::error!("Message not delivered: {} (text: {})", err, text);
                false
            }
        }
    }
}
