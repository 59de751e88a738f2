use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited fetching {channel} (retry after {retry_after_secs}s)")]
    RateLimited {
        channel: String,
        retry_after_secs: u64,
    },

    #[error("channel preview not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid channel handle \"{channel}\": {reason}")]
    InvalidChannel { channel: String, reason: String },
}
