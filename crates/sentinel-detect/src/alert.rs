//! Alert payloads and their operator-facing text.

use std::collections::HashSet;

use serde::Serialize;

use crate::matcher::{TermMatcher, Vocabulary};
use crate::types::{Alert, Post};

/// Upper bound on citation links per alert.
pub const MAX_CITATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub source_id: String,
    pub link: String,
}

/// Everything the notification sink needs for one alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPayload {
    pub pattern: String,
    pub count: u32,
    pub baseline_rate: f64,
    pub citations: Vec<Citation>,
}

/// Attach up to [`MAX_CITATIONS`] example posts to an alert.
///
/// A post qualifies when its text matches every constituent term of the
/// pattern. Posts sharing a link are cited once. An alert with no qualifying
/// posts still produces a payload.
#[must_use]
pub fn build_payload(alert: &Alert, posts: &[Post], vocabulary: &Vocabulary) -> AlertPayload {
    let fallback: Vec<TermMatcher>;
    let matchers: Vec<&TermMatcher> = {
        let terms = alert.pattern.terms();
        if terms.iter().all(|t| vocabulary.matcher(t).is_some()) {
            terms.iter().filter_map(|t| vocabulary.matcher(t)).collect()
        } else {
            fallback = terms.iter().map(|t| TermMatcher::compile(t)).collect();
            fallback.iter().collect()
        }
    };

    let mut seen_links = HashSet::new();
    let citations: Vec<Citation> = posts
        .iter()
        .filter(|p| matchers.iter().all(|m| m.is_match(&p.text)))
        .filter(|p| seen_links.insert(p.link.as_str()))
        .take(MAX_CITATIONS)
        .map(|p| Citation {
            source_id: p.source_id.clone(),
            link: p.link.clone(),
        })
        .collect();

    if citations.is_empty() {
        tracing::debug!(pattern = %alert.pattern, "no citation posts found for alert");
    }

    AlertPayload {
        pattern: alert.pattern.label(),
        count: alert.count,
        baseline_rate: alert.baseline_rate,
        citations,
    }
}

impl AlertPayload {
    /// Render as Telegram legacy-Markdown text ending with `tag`.
    #[must_use]
    pub fn render(&self, tag: &str) -> String {
        let mut out = format!(
            "🚨 *SENTINEL ALERT: {}*\n\n",
            escape_markdown(&self.pattern)
        );
        out.push_str(&format!("🔥 Velocity: {} hits (this window)\n", self.count));
        out.push_str(&format!(
            "📊 Normal Baseline: {:.2}/hr\n\n",
            self.baseline_rate
        ));
        out.push_str("Sources:\n");
        if self.citations.is_empty() {
            out.push_str("- none found\n");
        }
        for c in &self.citations {
            out.push_str(&format!(
                "- [{}]({})\n",
                escape_markdown(&c.source_id),
                c.link
            ));
        }
        out.push('\n');
        out.push_str(tag);
        out
    }
}

/// Escape the characters legacy Markdown treats as entity delimiters.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use sentinel_core::PatternsConfig;

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
            status: vec!["outage".into()],
        })
    }

    fn fire_alert() -> Alert {
        Alert {
            pattern: Pattern::composite("fire", "downtown"),
            count: 5,
            baseline_rate: 0.05,
        }
    }

    #[test]
    fn cites_only_posts_matching_all_terms() {
        let posts = vec![
            post("a", 1, "fire downtown"),
            post("b", 2, "fire uptown"),
            post("c", 3, "downtown is calm"),
            post("d", 4, "huge fire near downtown"),
        ];
        let payload = build_payload(&fire_alert(), &posts, &vocab());
        let links: Vec<&str> = payload.citations.iter().map(|c| c.link.as_str()).collect();
        assert_eq!(links, vec!["https://t.me/a/1", "https://t.me/d/4"]);
        assert_eq!(payload.pattern, "fire at downtown");
        assert_eq!(payload.count, 5);
    }

    #[test]
    fn caps_citations_at_three() {
        let posts: Vec<Post> = (1..=6)
            .map(|i| post("a", i, &format!("fire downtown #{i}")))
            .collect();
        let payload = build_payload(&fire_alert(), &posts, &vocab());
        assert_eq!(payload.citations.len(), MAX_CITATIONS);
    }

    #[test]
    fn repeated_links_cited_once() {
        let posts = vec![post("a", 1, "fire downtown"), post("a", 1, "fire downtown")];
        let payload = build_payload(&fire_alert(), &posts, &vocab());
        assert_eq!(payload.citations.len(), 1);
    }

    #[test]
    fn zero_citations_still_builds_payload() {
        let payload = build_payload(&fire_alert(), &[], &vocab());
        assert!(payload.citations.is_empty());
        assert!(payload.render("#TrendSentinel").contains("none found"));
    }

    #[test]
    fn terms_outside_vocabulary_are_compiled_on_demand() {
        let alert = Alert {
            pattern: Pattern::Status("blackout".into()),
            count: 4,
            baseline_rate: 0.1,
        };
        let posts = vec![post("a", 1, "city blackout")];
        let payload = build_payload(&alert, &posts, &vocab());
        assert_eq!(payload.citations.len(), 1);
    }

    #[test]
    fn render_includes_counts_rate_links_and_tag() {
        let payload = AlertPayload {
            pattern: "fire at down_town".into(),
            count: 5,
            baseline_rate: 0.049,
            citations: vec![Citation {
                source_id: "news_feed".into(),
                link: "https://t.me/news_feed/7".into(),
            }],
        };
        let text = payload.render("#TrendSentinel");
        assert!(text.starts_with("🚨 *SENTINEL ALERT: fire at down\\_town*"));
        assert!(text.contains("Velocity: 5 hits"));
        assert!(text.contains("Normal Baseline: 0.05/hr"));
        assert!(text.contains("- [news\\_feed](https://t.me/news_feed/7)"));
        assert!(text.ends_with("#TrendSentinel"));
    }

    #[test]
    fn render_layout_is_exact() {
        let payload = AlertPayload {
            pattern: "fire at downtown".into(),
            count: 4,
            baseline_rate: 0.1,
            citations: vec![
                Citation {
                    source_id: "a".into(),
                    link: "https://t.me/a/1".into(),
                },
                Citation {
                    source_id: "b".into(),
                    link: "https://t.me/b/2".into(),
                },
            ],
        };
        assert_eq!(
            payload.render("#T"),
            "🚨 *SENTINEL ALERT: fire at downtown*\n\n\
             🔥 Velocity: 4 hits (this window)\n\
             📊 Normal Baseline: 0.10/hr\n\n\
             Sources:\n\
             - [a](https://t.me/a/1)\n\
             - [b](https://t.me/b/2)\n\
             \n\
             #T"
        );
    }
}
