//! Window detection orchestration.

use sentinel_core::{PatternsConfig, StaleConfig};

use crate::aggregate::aggregate;
use crate::alert::{build_payload, AlertPayload};
use crate::baseline::BaselineTable;
use crate::matcher::Vocabulary;
use crate::spike::{detect_spikes, SpikeThresholds};
use crate::stale::StaleFilter;
use crate::types::{BatchCounts, Post};

/// Outcome of one window.
#[derive(Debug, Clone, Default)]
pub struct WindowReport {
    pub counts: BatchCounts,
    pub alerts: Vec<AlertPayload>,
    /// Posts handed in, before de-duplication and the stale filter.
    pub posts_in: usize,
    pub counted: usize,
    pub duplicates: usize,
    pub stale: usize,
}

/// Compiled vocabulary, stale filter and thresholds, reusable across runs.
#[derive(Debug, Clone)]
pub struct Detector {
    vocabulary: Vocabulary,
    stale: StaleFilter,
    thresholds: SpikeThresholds,
}

impl Detector {
    #[must_use]
    pub fn new(patterns: &PatternsConfig, stale: &StaleConfig, thresholds: SpikeThresholds) -> Self {
        let vocabulary = Vocabulary::compile(patterns);
        for term in vocabulary.degraded_terms() {
            tracing::warn!(term, "term uses substring matching");
        }
        Self {
            vocabulary,
            stale: StaleFilter::from_config(stale),
            thresholds,
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn thresholds(&self) -> &SpikeThresholds {
        &self.thresholds
    }

    /// Run detection over the new posts of one window.
    ///
    /// 1. Normalize, de-duplicate and drop stale posts.
    /// 2. Count patterns per post.
    /// 3. Compare counts with `baselines`.
    /// 4. Build one payload per spike, citing the counted posts.
    ///
    /// Pure: the same posts and baselines always give the same report.
    #[must_use]
    pub fn run(&self, posts: Vec<Post>, baselines: &BaselineTable) -> WindowReport {
        let posts_in = posts.len();
        let batch = aggregate(posts, &self.vocabulary, &self.stale);

        let alerts: Vec<AlertPayload> = detect_spikes(&batch.counts, baselines, &self.thresholds)
            .iter()
            .map(|alert| build_payload(alert, &batch.counted, &self.vocabulary))
            .collect();

        tracing::debug!(
            posts_in,
            counted = batch.counted.len(),
            duplicates = batch.duplicates,
            stale = batch.stale,
            patterns = batch.counts.len(),
            alerts = alerts.len(),
            "window detection complete"
        );

        WindowReport {
            counts: batch.counts,
            alerts,
            posts_in,
            counted: batch.counted.len(),
            duplicates: batch.duplicates,
            stale: batch.stale,
        }
    }
}
