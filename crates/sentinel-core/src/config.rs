use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_FEED_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or only one of
/// the two Telegram credentials is set.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid, or only one of
/// the two Telegram credentials is set.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates can leave blanks.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("SENTINEL_LOG_LEVEL", "info");
    let monitor_path = PathBuf::from(or_default(
        "SENTINEL_MONITOR_PATH",
        "./config/sentinel.yaml",
    ));
    let state_path = PathBuf::from(or_default(
        "SENTINEL_STATE_PATH",
        "./data/sentinel_state.json",
    ));
    let baseline_path = PathBuf::from(or_default(
        "SENTINEL_BASELINE_PATH",
        "./data/trend_baselines.json",
    ));
    let baseline_url = optional("SENTINEL_BASELINE_URL");

    let feed_base_url = or_default("SENTINEL_FEED_BASE_URL", "https://t.me/s/");
    let feed_request_timeout_secs = parse_u64("SENTINEL_FEED_REQUEST_TIMEOUT_SECS", "5")?;
    let feed_user_agent = or_default("SENTINEL_FEED_USER_AGENT", DEFAULT_FEED_USER_AGENT);
    let feed_inter_request_delay_ms = parse_u64("SENTINEL_FEED_INTER_REQUEST_DELAY_MS", "1000")?;
    let feed_max_retries = parse_u32("SENTINEL_FEED_MAX_RETRIES", "1")?;
    let feed_retry_backoff_base_secs = parse_u64("SENTINEL_FEED_RETRY_BACKOFF_BASE_SECS", "2")?;

    let min_count = parse_u32("SENTINEL_MIN_COUNT", "4")?;
    if min_count == 0 {
        return Err(invalid("SENTINEL_MIN_COUNT", "must be at least 1".into()));
    }

    let spike_multiplier = parse_f64("SENTINEL_SPIKE_MULTIPLIER", "10")?;
    if !spike_multiplier.is_finite() || spike_multiplier <= 0.0 {
        return Err(invalid(
            "SENTINEL_SPIKE_MULTIPLIER",
            format!("must be a positive finite number, got {spike_multiplier}"),
        ));
    }

    let default_baseline_rate = parse_f64("SENTINEL_DEFAULT_BASELINE_RATE", "0.1")?;
    if !default_baseline_rate.is_finite() || default_baseline_rate < 0.0 {
        return Err(invalid(
            "SENTINEL_DEFAULT_BASELINE_RATE",
            format!("must be a non-negative finite number, got {default_baseline_rate}"),
        ));
    }

    let alert_tag = or_default("SENTINEL_ALERT_TAG", "#TrendSentinel");
    let watch_cron = or_default("SENTINEL_WATCH_CRON", "0 */3 * * * *");
    let telegram_api_url = or_default("SENTINEL_TELEGRAM_API_URL", "https://api.telegram.org");
    let telegram_bot_token = optional("TELEGRAM_BOT_TOKEN");
    let telegram_chat_id = optional("TELEGRAM_CHAT_ID");
    match (&telegram_bot_token, &telegram_chat_id) {
        (Some(_), None) => return Err(ConfigError::MissingEnvVar("TELEGRAM_CHAT_ID".into())),
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into())),
        _ => {}
    }

    Ok(AppConfig {
        log_level,
        monitor_path,
        state_path,
        baseline_path,
        baseline_url,
        feed_base_url,
        feed_request_timeout_secs,
        feed_user_agent,
        feed_inter_request_delay_ms,
        feed_max_retries,
        feed_retry_backoff_base_secs,
        min_count,
        spike_multiplier,
        default_baseline_rate,
        alert_tag,
        watch_cron,
        telegram_api_url,
        telegram_bot_token,
        telegram_chat_id,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
