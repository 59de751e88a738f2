//! HTTP client for public channel preview pages (`https://t.me/s/<channel>`).

use std::time::Duration;

use reqwest::Client;
use sentinel_detect::Post;

use crate::error::ScraperError;
use crate::parse::parse_preview_html;
use crate::rate_limit::retry_with_backoff;

/// Fetches and parses the most recent posts of a public channel.
///
/// Transient errors (429, 5xx, network failures) are retried with exponential
/// backoff up to `max_retries` additional attempts. 404 is reported as
/// [`ScraperError::NotFound`] without retrying.
pub struct PreviewClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PreviewClient {
    /// `base_url` is the preview prefix the channel handle is appended to,
    /// e.g. `https://t.me/s/`. A missing trailing slash is added.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let mut base_url = base_url.to_owned();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetch the preview page for `channel` and return its posts sorted by id.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidChannel`] if the handle is empty or has
    ///   characters outside `[A-Za-z0-9_]`.
    /// - [`ScraperError::NotFound`] on HTTP 404.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after retries are exhausted.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Http`] on network or TLS failure.
    pub async fn fetch_channel(&self, channel: &str) -> Result<Vec<Post>, ScraperError> {
        validate_channel(channel)?;
        let url = format!("{}{channel}", self.base_url);

        let html = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(0);
                    return Err(ScraperError::RateLimited {
                        channel: channel.to_owned(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await?;

        let posts = parse_preview_html(&html, channel);
        tracing::debug!(channel, posts = posts.len(), "parsed preview page");
        Ok(posts)
    }
}

fn validate_channel(channel: &str) -> Result<(), ScraperError> {
    if channel.is_empty() {
        return Err(ScraperError::InvalidChannel {
            channel: channel.to_owned(),
            reason: "handle is empty".to_owned(),
        });
    }
    if let Some(bad) = channel
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(ScraperError::InvalidChannel {
            channel: channel.to_owned(),
            reason: format!("unexpected character {bad:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = PreviewClient::new("https://t.me/s", 5, "test/0.1", 0, 0).unwrap();
        assert_eq!(client.base_url, "https://t.me/s/");
    }

    #[test]
    fn valid_handles_pass() {
        assert!(validate_channel("VahidOnline").is_ok());
        assert!(validate_channel("news_24").is_ok());
    }

    #[test]
    fn empty_handle_is_rejected() {
        assert!(matches!(
            validate_channel(""),
            Err(ScraperError::InvalidChannel { .. })
        ));
    }

    #[test]
    fn path_characters_are_rejected() {
        for bad in ["../etc", "chan/1", "a b", "x?y=1"] {
            assert!(validate_channel(bad).is_err(), "{bad} should be rejected");
        }
    }
}
