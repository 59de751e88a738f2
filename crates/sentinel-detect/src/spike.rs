//! Baseline-relative spike decision.

use crate::baseline::BaselineTable;
use crate::types::{Alert, BatchCounts};

/// Thresholds for the flash-spike policy.
///
/// A pattern alerts when it was seen in at least `min_count` posts this window
/// **and** that count exceeds `multiplier` times its hourly baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeThresholds {
    pub min_count: u32,
    pub multiplier: f64,
    /// Hourly rate assumed for patterns absent from the baseline table.
    pub default_rate: f64,
}

impl Default for SpikeThresholds {
    fn default() -> Self {
        Self {
            min_count: 4,
            multiplier: 10.0,
            default_rate: 0.1,
        }
    }
}

impl SpikeThresholds {
    #[must_use]
    pub fn is_spike(&self, count: u32, baseline_rate: f64) -> bool {
        count >= self.min_count && f64::from(count) > baseline_rate * self.multiplier
    }
}

/// Compare window counts with baselines and return the patterns that spiked,
/// highest count first. Patterns below either threshold are dropped.
#[must_use]
pub fn detect_spikes(
    counts: &BatchCounts,
    baselines: &BaselineTable,
    thresholds: &SpikeThresholds,
) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .filter_map(|(pattern, count)| {
            let baseline_rate = baselines.rate_or(&pattern.label(), thresholds.default_rate);
            if thresholds.is_spike(count, baseline_rate) {
                Some(Alert {
                    pattern: pattern.clone(),
                    count,
                    baseline_rate,
                })
            } else {
                tracing::trace!(pattern = %pattern, count, baseline_rate, "below spike threshold");
                None
            }
        })
        .collect();

    alerts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));
    alerts
}
