//! `sentinel baselines build`: learn hourly word rates from corpus shards.

use std::path::Path;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use sentinel_store::{compute_baselines, fetch_corpus_shard, BaselineFile, CorpusItem};

const MAX_CONCURRENT_SHARDS: usize = 4;

/// Download every shard, compute the table and write it to `output`.
///
/// A shard that fails to download or parse is logged and skipped. Returns
/// the number of baselines written.
///
/// # Errors
///
/// Returns an error if every shard failed, the HTTP client cannot be built,
/// or the output file cannot be written.
pub(crate) async fn run_baselines_build(
    sources: &[String],
    output: &Path,
    timeout_secs: u64,
) -> anyhow::Result<usize> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let results: Vec<(&String, _)> = stream::iter(sources)
        .map(|url| {
            let client = &client;
            async move { (url, fetch_corpus_shard(client, url).await) }
        })
        .buffer_unordered(MAX_CONCURRENT_SHARDS)
        .collect()
        .await;

    let mut items: Vec<CorpusItem> = Vec::new();
    let mut failed = 0usize;
    for (url, result) in results {
        match result {
            Ok(shard) => {
                tracing::info!(url = %url, items = shard.len(), "downloaded corpus shard");
                items.extend(shard);
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "skipping corpus shard");
                failed += 1;
            }
        }
    }

    if failed == sources.len() {
        anyhow::bail!("all {failed} corpus shards failed to download");
    }

    let baselines = compute_baselines(&items);
    let count = baselines.len();
    #[allow(clippy::cast_precision_loss)]
    let updated_at = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
    BaselineFile {
        updated_at: Some(updated_at),
        baselines,
    }
    .write(output)?;

    tracing::info!(
        output = %output.display(),
        items = items.len(),
        baselines = count,
        failed_shards = failed,
        "baseline table written"
    );
    Ok(count)
}
