//! Learned hourly rates per pattern label.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Pattern label → expected occurrences per hour.
///
/// Only finite, non-negative rates are kept; anything else is dropped on
/// construction or deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BaselineTable(HashMap<String, f64>);

impl BaselineTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rate(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Rate for `label`, or `default` when the table has no entry.
    #[must_use]
    pub fn rate_or(&self, label: &str, default: f64) -> f64 {
        self.rate(label).unwrap_or(default)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for BaselineTable {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        let mut rates = HashMap::new();
        for (label, rate) in iter {
            if rate.is_finite() && rate >= 0.0 {
                rates.insert(label, rate);
            } else {
                tracing::warn!(pattern = %label, rate, "dropping invalid baseline rate");
            }
        }
        Self(rates)
    }
}

impl<'de> Deserialize<'de> for BaselineTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, f64>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_or_uses_default_for_missing_label() {
        let table: BaselineTable = [("fire at downtown".to_string(), 0.05)].into_iter().collect();
        assert!((table.rate_or("fire at downtown", 0.1) - 0.05).abs() < f64::EPSILON);
        assert!((table.rate_or("flood at uptown", 0.1) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_rates_are_dropped() {
        let table: BaselineTable = [
            ("neg".to_string(), -1.0),
            ("nan".to_string(), f64::NAN),
            ("inf".to_string(), f64::INFINITY),
            ("ok".to_string(), 0.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate("ok"), Some(0.0));
    }

    #[test]
    fn deserializes_from_plain_object() {
        let table: BaselineTable =
            serde_json::from_str(r#"{"جنگ": 1.25, "bad": -3}"#).expect("valid json");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate("جنگ"), Some(1.25));
    }

    #[test]
    fn serializes_transparently() {
        let table: BaselineTable = [("x".to_string(), 2.0)].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"x":2.0}"#);
    }
}
