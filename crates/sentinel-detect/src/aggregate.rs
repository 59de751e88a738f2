//! Per-window counting with run-scoped de-duplication.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::composite::build_patterns;
use crate::matcher::Vocabulary;
use crate::stale::StaleFilter;
use crate::types::{BatchCounts, Post};

/// Result of aggregating one window.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub counts: BatchCounts,
    /// Normalized posts that survived de-duplication and the stale filter.
    pub counted: Vec<Post>,
    pub duplicates: usize,
    pub stale: usize,
}

/// Count patterns across the window's posts.
///
/// Posts are normalized and visited in arrival order. A post whose normalized
/// text was already seen earlier in this call is skipped, whatever its source.
/// Stale posts are skipped. Every surviving post adds exactly 1 to each
/// pattern it contains.
pub fn aggregate<I>(posts: I, vocabulary: &Vocabulary, stale: &StaleFilter) -> Batch
where
    I: IntoIterator<Item = Post>,
{
    let mut batch = Batch::default();
    let mut seen: HashSet<[u8; 32]> = HashSet::new();

    for post in posts {
        let post = post.normalized();
        if post.text.trim().is_empty() {
            continue;
        }

        let digest: [u8; 32] = Sha256::digest(post.text.as_bytes()).into();
        if !seen.insert(digest) {
            batch.duplicates += 1;
            tracing::debug!(source = %post.source_id, id = post.id, "skipping duplicate post text");
            continue;
        }

        if stale.is_stale(&post.text) {
            batch.stale += 1;
            tracing::debug!(source = %post.source_id, id = post.id, "skipping stale post");
            continue;
        }

        for pattern in build_patterns(&post.text, vocabulary) {
            batch.counts.increment(pattern);
        }
        batch.counted.push(post);
    }

    batch
}

#[cfg(test)]
mod tests {
    use sentinel_core::{PatternsConfig, StaleConfig};

    use super::*;
    use crate::types::Pattern;

    fn post(source: &str, id: i64, text: &str) -> Post {
        Post {
            id,
            source_id: source.to_string(),
            text: text.to_string(),
            link: format!("https://t.me/{source}/{id}"),
        }
    }

    fn vocab() -> Vocabulary {
        Vocabulary::compile(&PatternsConfig {
            incidents: vec!["fire".into()],
            locations: vec!["downtown".into()],
            status: vec![],
        })
    }

    fn stale_filter(current_month: Option<u8>) -> StaleFilter {
        StaleFilter::from_config(&StaleConfig {
            current_month,
            ..StaleConfig::default()
        })
    }

    #[test]
    fn counts_posts_not_occurrences() {
        let posts = vec![post("a", 1, "fire fire fire downtown downtown")];
        let batch = aggregate(posts, &vocab(), &stale_filter(None));
        assert_eq!(batch.counts.get(&Pattern::composite("fire", "downtown")), 1);
    }

    #[test]
    fn identical_text_across_sources_counts_once() {
        let posts = vec![
            post("a", 10, "fire downtown"),
            post("b", 99, "fire downtown"),
            post("c", 3, "another fire downtown"),
        ];
        let batch = aggregate(posts, &vocab(), &stale_filter(None));
        assert_eq!(batch.counts.get(&Pattern::composite("fire", "downtown")), 2);
        assert_eq!(batch.duplicates, 1);
        assert_eq!(batch.counted.len(), 2);
        assert_eq!(batch.counted[0].source_id, "a");
    }

    #[test]
    fn duplicates_detected_after_normalization() {
        let vocab = Vocabulary::compile(&PatternsConfig {
            incidents: vec!["آتش".into()],
            locations: vec!["کرج".into()],
            status: vec![],
        });
        let posts = vec![post("a", 1, "آتش در كرج"), post("b", 2, "آتش در کرج")];
        let batch = aggregate(posts, &vocab, &stale_filter(None));
        assert_eq!(batch.counts.get(&Pattern::composite("آتش", "کرج")), 1);
        assert_eq!(batch.duplicates, 1);
    }

    #[test]
    fn stale_posts_are_excluded_from_counts() {
        let posts = vec![
            post("a", 1, "fire downtown ۱۲ خرداد"),
            post("a", 2, "fire downtown now"),
        ];
        let batch = aggregate(posts, &vocab(), &stale_filter(Some(7)));
        assert_eq!(batch.counts.get(&Pattern::composite("fire", "downtown")), 1);
        assert_eq!(batch.stale, 1);
        assert_eq!(batch.counted.len(), 1);
    }

    #[test]
    fn empty_text_posts_are_ignored() {
        let posts = vec![post("a", 1, ""), post("a", 2, "   ")];
        let batch = aggregate(posts, &vocab(), &stale_filter(None));
        assert!(batch.counts.is_empty());
        assert!(batch.counted.is_empty());
        assert_eq!(batch.duplicates, 0);
    }

    #[test]
    fn unmatched_posts_are_still_counted_as_surviving() {
        let posts = vec![post("a", 1, "nothing to see")];
        let batch = aggregate(posts, &vocab(), &stale_filter(None));
        assert!(batch.counts.is_empty());
        assert_eq!(batch.counted.len(), 1);
    }
}
