//! Extraction of posts from a channel's public preview page.
//!
//! The page lists messages as `<div class="tgme_widget_message ..."
//! data-post="<channel>/<id>">` blocks, each holding the message body in a
//! `tgme_widget_message_text` div. Quoted replies carry a second text div
//! marked `js-message_reply_text`, which is skipped.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use sentinel_detect::Post;

static DATA_POST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-post="([A-Za-z0-9_]+)/(\d+)""#).expect("valid data-post regex")
});
static TEXT_DIV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div class="(tgme_widget_message_text[^"]*)"[^>]*>(.*?)</div>"#)
        .expect("valid text div regex")
});
static BR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex")
});

/// Parse every post on a preview page for `channel`.
///
/// Posts are returned sorted by id with duplicates removed. A message with no
/// text block (media only) is still returned, with empty text, so its id can
/// advance the cursor.
#[must_use]
pub fn parse_preview_html(html: &str, channel: &str) -> Vec<Post> {
    let markers: Vec<_> = DATA_POST_RE.captures_iter(html).collect();
    let mut posts = Vec::with_capacity(markers.len());

    for (i, caps) in markers.iter().enumerate() {
        let (Some(whole), Some(post_channel), Some(raw_id)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let Ok(id) = raw_id.as_str().parse::<i64>() else {
            tracing::debug!(channel, raw_id = raw_id.as_str(), "skipping unparseable post id");
            continue;
        };

        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let block = &html[whole.end()..end];

        let text = TEXT_DIV_RE
            .captures_iter(block)
            .find(|c| !c[1].contains("reply"))
            .and_then(|c| c.get(2))
            .map(|m| html_to_text(m.as_str()))
            .unwrap_or_default();

        posts.push(Post {
            id,
            source_id: channel.to_string(),
            text,
            link: format!("https://t.me/{}/{id}", post_channel.as_str()),
        });
    }

    posts.sort_by_key(|p| p.id);
    posts.dedup_by_key(|p| p.id);
    posts
}

/// Convert a message body fragment into plain text: line breaks become
/// spaces, tags are dropped, entities decoded, whitespace collapsed.
#[must_use]
pub(crate) fn html_to_text(fragment: &str) -> String {
    let spaced = BR_RE.replace_all(fragment, " ");
    let stripped = TAG_RE.replace_all(&spaced, "");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named, decimal and hex HTML entities. Unknown entities are kept
/// verbatim.
#[must_use]
pub(crate) fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "zwnj" => Some('\u{200c}'),
        "zwj" => Some('\u{200d}'),
        _ => None,
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
