use thiserror::Error;

/// Errors returned when delivering an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API rejected the message.
    #[error("Telegram API error (HTTP {status}): {description}")]
    Api { status: u16, description: String },

    #[error("invalid Telegram API base URL '{0}'")]
    InvalidBaseUrl(String),
}
