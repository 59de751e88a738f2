//! One polling window: fetch every watched channel, keep the posts past each
//! cursor, run detection, dispatch alerts, persist cursors.
//!
//! A failing channel is logged and skipped; a failing alert is logged and
//! dropped. Neither aborts the run, and cursors for every channel that was
//! fetched are saved at the end.

use std::future::Future;
use std::time::Duration;

use sentinel_core::AppConfig;
use sentinel_detect::{BaselineTable, Detector, Post, SpikeThresholds};
use sentinel_notify::TelegramNotifier;
use sentinel_scraper::PreviewClient;
use sentinel_store::{BaselineProvider, CursorStore};
use tracing::Instrument;

/// Source of posts for one channel.
pub(crate) trait PostFeed {
    fn fetch(&self, source_id: &str) -> impl Future<Output = anyhow::Result<Vec<Post>>> + Send;
}

/// Destination for rendered alert text.
pub(crate) trait AlertSink {
    fn send(&self, text: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl PostFeed for PreviewClient {
    async fn fetch(&self, source_id: &str) -> anyhow::Result<Vec<Post>> {
        Ok(self.fetch_channel(source_id).await?)
    }
}

/// Telegram delivery when credentials are configured, otherwise log only.
pub(crate) enum Dispatcher {
    Telegram(TelegramNotifier),
    LogOnly,
}

impl AlertSink for Dispatcher {
    async fn send(&self, text: &str) -> anyhow::Result<()> {
        match self {
            Self::Telegram(notifier) => Ok(notifier.send(text).await?),
            Self::LogOnly => {
                tracing::info!(alert = %text, "alert (notifications disabled)");
                Ok(())
            }
        }
    }
}

/// Per-run knobs that do not belong to detection itself.
#[derive(Debug, Clone)]
pub(crate) struct ScanOptions {
    pub inter_request_delay: Duration,
    pub alert_tag: String,
    /// Detect and print alerts without sending them or saving cursors.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScanSummary {
    pub sources_polled: usize,
    pub sources_failed: usize,
    pub new_posts: usize,
    pub counted_posts: usize,
    pub duplicates: usize,
    pub stale: usize,
    pub alerts_raised: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
    /// Polling stopped early on shutdown.
    pub interrupted: bool,
    /// Rendered alert texts, in dispatch order.
    pub alerts: Vec<String>,
}

/// Run one window over `nodes`.
///
/// `shutdown` is checked between channels; when it resolves, polling stops,
/// detection still runs over what was collected and cursors are still saved.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_scan<F, S>(
    nodes: &[String],
    feed: &F,
    sink: &S,
    detector: &Detector,
    baselines: &BaselineTable,
    cursors: &mut CursorStore,
    options: &ScanOptions,
    shutdown: impl Future<Output = ()>,
) -> ScanSummary
where
    F: PostFeed,
    S: AlertSink,
{
    let mut shutdown = std::pin::pin!(shutdown);
    let mut summary = ScanSummary::default();
    let mut new_posts: Vec<Post> = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::warn!(remaining = nodes.len() - i, "shutdown requested; stopping poll");
                    summary.interrupted = true;
                    break;
                }
                () = tokio::time::sleep(options.inter_request_delay) => {}
            }
        }

        summary.sources_polled += 1;
        let posts = match feed.fetch(node).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(source = %node, error = %e, "feed unavailable; skipping source");
                summary.sources_failed += 1;
                continue;
            }
        };

        let fetched = posts.len();
        let fresh = cursors.filter_new(node, posts);
        cursors.advance(node, &fresh);
        tracing::debug!(source = %node, fetched, new = fresh.len(), "polled source");
        new_posts.extend(fresh);
    }

    summary.new_posts = new_posts.len();
    let report = detector.run(new_posts, baselines);
    summary.counted_posts = report.counted;
    summary.duplicates = report.duplicates;
    summary.stale = report.stale;
    summary.alerts_raised = report.alerts.len();

    for payload in &report.alerts {
        let text = payload.render(&options.alert_tag);
        tracing::info!(
            pattern = %payload.pattern,
            count = payload.count,
            baseline_rate = payload.baseline_rate,
            citations = payload.citations.len(),
            "spike detected"
        );
        if options.dry_run {
            println!("{text}\n");
        } else {
            match sink.send(&text).await {
                Ok(()) => summary.alerts_sent += 1,
                Err(e) => {
                    tracing::warn!(pattern = %payload.pattern, error = %e, "alert dispatch failed");
                    summary.alerts_failed += 1;
                }
            }
        }
        summary.alerts.push(text);
    }

    if options.dry_run {
        tracing::info!("dry run: cursors not saved");
    } else if let Err(e) = cursors.save() {
        tracing::error!(path = %cursors.path().display(), error = %e, "failed to persist cursors");
    }

    summary
}

/// Build the collaborators from configuration and run one window inside a
/// `scan` span carrying a fresh run id.
///
/// # Errors
///
/// Returns an error if the monitor file cannot be loaded or an HTTP client
/// cannot be constructed. Feed, baseline and dispatch failures never surface
/// here.
pub(crate) async fn run_scan_once(
    config: &AppConfig,
    dry_run: bool,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<ScanSummary> {
    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("scan", run_id = %run_id);

    async move {
        let monitor = sentinel_core::load_monitor(&config.monitor_path)?;
        let detector = Detector::new(&monitor.patterns, &monitor.stale, thresholds(config));

        let baselines = BaselineProvider::new(
            config.baseline_url.as_deref(),
            &config.baseline_path,
            config.feed_request_timeout_secs,
        )?
        .load()
        .await;

        let feed = PreviewClient::new(
            &config.feed_base_url,
            config.feed_request_timeout_secs,
            &config.feed_user_agent,
            config.feed_max_retries,
            config.feed_retry_backoff_base_secs,
        )?;
        let sink = build_dispatcher(config)?;
        let mut cursors = CursorStore::load(&config.state_path);

        let options = ScanOptions {
            inter_request_delay: Duration::from_millis(config.feed_inter_request_delay_ms),
            alert_tag: config.alert_tag.clone(),
            dry_run,
        };

        tracing::info!(sources = monitor.nodes.len(), dry_run, "scan starting");
        let summary = run_scan(
            &monitor.nodes,
            &feed,
            &sink,
            &detector,
            &baselines,
            &mut cursors,
            &options,
            shutdown,
        )
        .await;

        tracing::info!(
            sources_polled = summary.sources_polled,
            sources_failed = summary.sources_failed,
            new_posts = summary.new_posts,
            counted_posts = summary.counted_posts,
            duplicates = summary.duplicates,
            stale = summary.stale,
            alerts_raised = summary.alerts_raised,
            alerts_sent = summary.alerts_sent,
            alerts_failed = summary.alerts_failed,
            interrupted = summary.interrupted,
            "scan complete"
        );
        Ok::<_, anyhow::Error>(summary)
    }
    .instrument(span)
    .await
}

pub(crate) fn thresholds(config: &AppConfig) -> SpikeThresholds {
    SpikeThresholds {
        min_count: config.min_count,
        multiplier: config.spike_multiplier,
        default_rate: config.default_baseline_rate,
    }
}

fn build_dispatcher(config: &AppConfig) -> anyhow::Result<Dispatcher> {
    match (&config.telegram_bot_token, &config.telegram_chat_id) {
        (Some(token), Some(chat_id)) => Ok(Dispatcher::Telegram(TelegramNotifier::with_base_url(
            token,
            chat_id,
            config.feed_request_timeout_secs,
            &config.telegram_api_url,
        )?)),
        _ => {
            tracing::warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set; alerts will only be logged");
            Ok(Dispatcher::LogOnly)
        }
    }
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
