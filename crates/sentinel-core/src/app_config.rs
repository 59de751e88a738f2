use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub monitor_path: PathBuf,
    pub state_path: PathBuf,
    pub baseline_path: PathBuf,
    pub baseline_url: Option<String>,
    pub feed_base_url: String,
    pub feed_request_timeout_secs: u64,
    pub feed_user_agent: String,
    pub feed_inter_request_delay_ms: u64,
    pub feed_max_retries: u32,
    pub feed_retry_backoff_base_secs: u64,
    /// Minimum posts in one window before a pattern can alert.
    pub min_count: u32,
    /// How many times the hourly baseline a window count must exceed.
    pub spike_multiplier: f64,
    /// Hourly rate assumed for patterns missing from the baseline table.
    /// Lower values let never-seen patterns alert on fewer posts.
    pub default_baseline_rate: f64,
    pub alert_tag: String,
    pub watch_cron: String,
    pub telegram_api_url: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl AppConfig {
    /// Both Telegram credentials are present, so alerts can be delivered.
    #[must_use]
    pub fn notifications_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("monitor_path", &self.monitor_path)
            .field("state_path", &self.state_path)
            .field("baseline_path", &self.baseline_path)
            .field("baseline_url", &self.baseline_url)
            .field("feed_base_url", &self.feed_base_url)
            .field(
                "feed_request_timeout_secs",
                &self.feed_request_timeout_secs,
            )
            .field("feed_user_agent", &self.feed_user_agent)
            .field(
                "feed_inter_request_delay_ms",
                &self.feed_inter_request_delay_ms,
            )
            .field("feed_max_retries", &self.feed_max_retries)
            .field(
                "feed_retry_backoff_base_secs",
                &self.feed_retry_backoff_base_secs,
            )
            .field("min_count", &self.min_count)
            .field("spike_multiplier", &self.spike_multiplier)
            .field("default_baseline_rate", &self.default_baseline_rate)
            .field("alert_tag", &self.alert_tag)
            .field("watch_cron", &self.watch_cron)
            .field("telegram_api_url", &self.telegram_api_url)
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "telegram_chat_id",
                &self.telegram_chat_id.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
