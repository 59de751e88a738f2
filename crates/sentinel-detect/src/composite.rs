//! Pattern synthesis for a single post.

use std::collections::BTreeSet;

use crate::matcher::{TermMatcher, Vocabulary};
use crate::types::Pattern;

/// Every pattern one post contributes.
///
/// Incidents and locations are matched independently and combined as a full
/// cross product, so 2 incidents and 2 locations give 4 composite patterns.
/// A post with no location yields no composites. Each matched status term is
/// a standalone pattern.
#[must_use]
pub fn build_patterns(text: &str, vocabulary: &Vocabulary) -> BTreeSet<Pattern> {
    let mut patterns = BTreeSet::new();

    let incidents = matched_terms(text, vocabulary.incidents());
    let locations = matched_terms(text, vocabulary.locations());
    for incident in &incidents {
        for location in &locations {
            patterns.insert(Pattern::composite(incident, location));
        }
    }

    for status in matched_terms(text, vocabulary.statuses()) {
        patterns.insert(Pattern::Status(status.to_string()));
    }

    patterns
}

fn matched_terms<'a>(text: &str, matchers: &'a [TermMatcher]) -> Vec<&'a str> {
    matchers
        .iter()
        .filter(|m| m.is_match(text))
        .map(TermMatcher::term)
        .collect()
}
