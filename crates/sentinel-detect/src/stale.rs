//! Heuristic filter for reposted or old content.
//!
//! The month rule compares against a fixed "current month" ordinal and knows
//! nothing about years: early in a year, posts naming last year's late months
//! pass through. Post timestamps are not consulted.

use sentinel_core::StaleConfig;

use crate::matcher::TermMatcher;

#[derive(Debug, Clone, Default)]
pub struct StaleFilter {
    old_year_markers: Vec<TermMatcher>,
    earlier_months: Vec<TermMatcher>,
}

impl StaleFilter {
    #[must_use]
    pub fn from_config(config: &StaleConfig) -> Self {
        let old_year_markers = config
            .old_year_markers
            .iter()
            .map(|m| TermMatcher::compile(m))
            .collect();

        // Months strictly before the current ordinal (1-based).
        let earlier = config
            .current_month
            .map_or(0, |m| usize::from(m).saturating_sub(1))
            .min(config.months.len());
        let earlier_months = config.months[..earlier]
            .iter()
            .map(|m| TermMatcher::compile(m))
            .collect();

        Self {
            old_year_markers,
            earlier_months,
        }
    }

    /// `true` if the text mentions an old-year marker or an earlier month.
    #[must_use]
    pub fn is_stale(&self, text: &str) -> bool {
        self.old_year_markers
            .iter()
            .chain(&self.earlier_months)
            .any(|m| m.is_match(text))
    }
}
