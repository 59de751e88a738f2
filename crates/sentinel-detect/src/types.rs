use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use sentinel_core::normalize;

/// One message fetched from a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Increases over time within one source; not unique across sources.
    pub id: i64,
    pub source_id: String,
    pub text: String,
    pub link: String,
}

impl Post {
    /// Return the post with its text canonicalized. Safe to call repeatedly.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.text = normalize(&self.text);
        self
    }
}

/// A countable pattern synthesized from one post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pattern {
    /// An incident and a location matched in the same post.
    Composite { incident: String, location: String },
    /// A status term on its own.
    Status(String),
}

impl Pattern {
    #[must_use]
    pub fn composite(incident: &str, location: &str) -> Self {
        Self::Composite {
            incident: incident.to_string(),
            location: location.to_string(),
        }
    }

    /// Canonical key, also used to look up the baseline rate.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Constituent vocabulary terms.
    #[must_use]
    pub fn terms(&self) -> Vec<&str> {
        match self {
            Self::Composite { incident, location } => vec![incident.as_str(), location.as_str()],
            Self::Status(term) => vec![term.as_str()],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite { incident, location } => write!(f, "{incident} at {location}"),
            Self::Status(term) => f.write_str(term),
        }
    }
}

/// Per-pattern count of posts in the current window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCounts(BTreeMap<Pattern, u32>);

impl BatchCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, pattern: Pattern) {
        *self.0.entry(pattern).or_insert(0) += 1;
    }

    #[must_use]
    pub fn get(&self, pattern: &Pattern) -> u32 {
        self.0.get(pattern).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, u32)> {
        self.0.iter().map(|(p, c)| (p, *c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A pattern whose window count cleared both spike thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub pattern: Pattern,
    pub count: u32,
    /// Expected occurrences per hour, from the table or the default.
    pub baseline_rate: f64,
}
