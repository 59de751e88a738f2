//! Offline baseline learning from a historical corpus.
//!
//! Word frequencies are divided by the corpus time span to give an hourly
//! rate per word. The result seeds [`BaselineFile`](crate::BaselineFile).

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use sentinel_detect::{normalize, BaselineTable};

use crate::error::StoreError;

/// Common Persian function words excluded from the table.
pub const STOPWORDS: &[&str] = &[
    "در", "به", "از", "که", "می", "این", "است", "را", "با", "های", "برای", "آن", "او",
];

/// A word must appear more often than this to get a baseline.
const MIN_OCCURRENCES: u32 = 5;

/// One historical message from a corpus shard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorpusItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Compute hourly word rates over the corpus.
///
/// Returns an empty table when no item carries a parseable date. Spans shorter
/// than one hour count as one hour. Rates are rounded to 4 decimals.
#[must_use]
pub fn compute_baselines(items: &[CorpusItem]) -> BaselineTable {
    let dates: Vec<DateTime<Utc>> = items
        .iter()
        .filter_map(|i| i.date.as_deref())
        .filter_map(parse_date)
        .collect();

    let (Some(min), Some(max)) = (dates.iter().min(), dates.iter().max()) else {
        tracing::warn!(items = items.len(), "corpus has no parseable dates");
        return BaselineTable::new();
    };

    #[allow(clippy::cast_precision_loss)]
    let hours = ((*max - *min).num_seconds() as f64 / 3600.0).max(1.0);
    tracing::info!(hours, items = items.len(), "analyzing corpus span");

    let mut word_counts: HashMap<String, u32> = HashMap::new();
    for item in items {
        let text = normalize(&item.text);
        for word in text.split_whitespace() {
            if word.chars().count() > 2 && !STOPWORDS.contains(&word) {
                *word_counts.entry(word.to_string()).or_insert(0) += 1;
            }
        }
    }

    word_counts
        .into_iter()
        .filter(|(_, count)| *count > MIN_OCCURRENCES)
        .map(|(word, count)| {
            let rate = (f64::from(count) / hours * 10_000.0).round() / 10_000.0;
            (word, rate)
        })
        .collect()
}

/// RFC 3339, or a naive ISO timestamp taken as UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Download one corpus shard (a JSON array of [`CorpusItem`]).
///
/// # Errors
///
/// Returns [`StoreError::Http`] on network failure,
/// [`StoreError::UnexpectedStatus`] on a non-2xx response, or
/// [`StoreError::Json`] if the body is not an item array.
pub async fn fetch_corpus_shard(client: &Client, url: &str) -> Result<Vec<CorpusItem>, StoreError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| StoreError::Json {
        context: url.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, date: Option<&str>) -> CorpusItem {
        CorpusItem {
            text: text.to_string(),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn no_dates_gives_empty_table() {
        let items = vec![item("انفجار انفجار انفجار", None); 10];
        assert!(compute_baselines(&items).is_empty());
    }

    #[test]
    fn empty_corpus_gives_empty_table() {
        assert!(compute_baselines(&[]).is_empty());
    }

    #[test]
    fn rate_is_count_over_span_hours() {
        // 12 mentions across a 4 hour span -> 3.0/hr
        let mut items = Vec::new();
        for i in 0..12 {
            let date = if i == 0 {
                "2024-05-20T00:00:00Z"
            } else if i == 11 {
                "2024-05-20T04:00:00Z"
            } else {
                "2024-05-20T02:00:00Z"
            };
            items.push(item("اعتراض", Some(date)));
        }
        let table = compute_baselines(&items);
        assert_eq!(table.rate("اعتراض"), Some(3.0));
    }

    #[test]
    fn short_span_counts_as_one_hour() {
        let items = vec![item("blackout", Some("2024-05-20T00:00:00+03:30")); 6];
        let table = compute_baselines(&items);
        assert_eq!(table.rate("blackout"), Some(6.0));
    }

    #[test]
    fn rare_short_and_stop_words_are_dropped() {
        let mut items = vec![item("rare", Some("2024-05-20T00:00:00Z"))];
        items.extend(vec![item("از ab common", Some("2024-05-20T00:30:00")); 6]);
        let table = compute_baselines(&items);
        assert!(table.rate("rare").is_none());
        assert!(table.rate("از").is_none());
        assert!(table.rate("ab").is_none());
        assert_eq!(table.rate("common"), Some(6.0));
    }

    #[test]
    fn words_are_normalized_before_counting() {
        let mut items = vec![item("كرمان", Some("2024-05-20T00:00:00Z")); 3];
        items.extend(vec![item("کرمان", Some("2024-05-20T00:00:00Z")); 3]);
        let table = compute_baselines(&items);
        assert_eq!(table.rate("کرمان"), Some(6.0));
    }

    #[test]
    fn rates_round_to_four_decimals() {
        // 7 mentions over 3 hours = 2.3333...
        let mut items = vec![item("word", Some("2024-05-20T00:00:00Z")); 6];
        items.push(item("word", Some("2024-05-20T03:00:00Z")));
        let table = compute_baselines(&items);
        assert_eq!(table.rate("word"), Some(2.3333));
    }
}
