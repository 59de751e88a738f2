//! `sendMessage` client for the Telegram Bot API.
//!
//! One call per alert. Failures are returned to the caller, which logs and
//! drops them; nothing here retries.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts alert text to a single chat.
///
/// Use [`TelegramNotifier::new`] for production or
/// [`TelegramNotifier::with_base_url`] to point at a mock server in tests.
pub struct TelegramNotifier {
    client: Client,
    chat_id: String,
    endpoint: Url,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // endpoint embeds the bot token
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .field("endpoint", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be constructed.
    pub fn new(bot_token: &str, chat_id: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(bot_token, chat_id, timeout_secs, DEFAULT_API_URL)
    }

    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be constructed,
    /// or [`NotifyError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        bot_token: &str,
        chat_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = format!(
            "{}/bot{bot_token}/sendMessage",
            base_url.trim_end_matches('/')
        );
        let endpoint =
            Url::parse(&endpoint).map_err(|_| NotifyError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            client,
            chat_id: chat_id.to_owned(),
            endpoint,
        })
    }

    /// Send `text` as a Markdown message with link previews disabled.
    ///
    /// # Errors
    ///
    /// - [`NotifyError::Http`] on network failure.
    /// - [`NotifyError::Api`] on a non-2xx status or an `"ok": false` body.
    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let form = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&form)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let envelope = serde_json::from_str::<ApiEnvelope>(&body).ok();

        if !status.is_success() || envelope.as_ref().is_some_and(|e| !e.ok) {
            let description = envelope
                .and_then(|e| e.description)
                .unwrap_or_else(|| truncate(&body, 200));
            return Err(NotifyError::Api {
                status: status.as_u16(),
                description,
            });
        }

        tracing::debug!(chat_id = %self.chat_id, "alert delivered");
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
