//! Whole-word term matching and the compiled watch vocabulary.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use sentinel_core::{normalize, PatternsConfig};

/// Compiled-program ceiling for one boundary pattern.
const BOUNDARY_SIZE_LIMIT: usize = 1 << 20;

/// Matcher for one vocabulary term.
///
/// The term must be bordered on both sides by the start/end of the text or a
/// non-word character. Word characters are Unicode-aware, so a Persian term
/// inside a longer Persian word does not match. If the boundary pattern cannot
/// be built the matcher falls back to plain substring containment.
#[derive(Debug, Clone)]
pub struct TermMatcher {
    term: String,
    boundary: Option<Regex>,
}

impl TermMatcher {
    #[must_use]
    pub fn compile(term: &str) -> Self {
        Self::compile_with_limit(term, BOUNDARY_SIZE_LIMIT)
    }

    fn compile_with_limit(term: &str, size_limit: usize) -> Self {
        let term = normalize(term);
        let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&term));
        let boundary = match RegexBuilder::new(&pattern).size_limit(size_limit).build() {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(
                    term = %term,
                    error = %e,
                    "boundary pattern failed to compile; falling back to substring match"
                );
                None
            }
        };
        Self { term, boundary }
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// `true` when this term is matched by substring instead of whole word.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.boundary.is_none()
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        match &self.boundary {
            Some(re) => re.is_match(text),
            None => text.contains(&self.term),
        }
    }
}

/// One-off whole-word match. Prefer a cached [`TermMatcher`] in loops.
#[must_use]
pub fn matches(text: &str, term: &str) -> bool {
    TermMatcher::compile(term).is_match(text)
}

/// The three watched vocabularies, compiled once at load.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    incidents: Vec<TermMatcher>,
    locations: Vec<TermMatcher>,
    statuses: Vec<TermMatcher>,
}

impl Vocabulary {
    #[must_use]
    pub fn compile(patterns: &PatternsConfig) -> Self {
        Self {
            incidents: compile_terms(&patterns.incidents),
            locations: compile_terms(&patterns.locations),
            statuses: compile_terms(&patterns.status),
        }
    }

    #[must_use]
    pub fn incidents(&self) -> &[TermMatcher] {
        &self.incidents
    }

    #[must_use]
    pub fn locations(&self) -> &[TermMatcher] {
        &self.locations
    }

    #[must_use]
    pub fn statuses(&self) -> &[TermMatcher] {
        &self.statuses
    }

    /// Look up the compiled matcher for a term from any category.
    #[must_use]
    pub fn matcher(&self, term: &str) -> Option<&TermMatcher> {
        self.all().find(|m| m.term == term)
    }

    /// Terms running on the substring fallback.
    pub fn degraded_terms(&self) -> impl Iterator<Item = &str> {
        self.all().filter(|m| m.is_degraded()).map(TermMatcher::term)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty() && self.locations.is_empty() && self.statuses.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &TermMatcher> {
        self.incidents
            .iter()
            .chain(&self.locations)
            .chain(&self.statuses)
    }
}

fn compile_terms(terms: &[String]) -> Vec<TermMatcher> {
    let mut seen = HashSet::new();
    terms
        .iter()
        .map(|t| TermMatcher::compile(t))
        .filter(|m| seen.insert(m.term.clone()))
        .collect()
}
