//! Per-channel high-water marks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sentinel_detect::Post;

use crate::error::StoreError;
use crate::fs::{read_json, write_json_atomic};

/// Highest post id already processed, per source, backed by a JSON file
/// shaped `{"<source>": <last_seen_id>}`.
///
/// Cursors only move forward. They are advanced to the largest id fetched,
/// whether or not downstream processing of those posts succeeds.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
    cursors: BTreeMap<String, i64>,
}

impl CursorStore {
    /// Load cursors from `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also starts
    /// empty, with a warning: posts get reprocessed, nothing is lost.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cursors = match read_json::<BTreeMap<String, i64>>(&path) {
            Ok(c) => c,
            Err(e) if e.is_not_found() => {
                tracing::info!(path = %path.display(), "no cursor state yet; starting fresh");
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cursor state unreadable; starting fresh"
                );
                BTreeMap::new()
            }
        };
        Self { path, cursors }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn cursor(&self, source_id: &str) -> Option<i64> {
        self.cursors.get(source_id).copied()
    }

    /// Keep only posts newer than the stored cursor, preserving order.
    #[must_use]
    pub fn filter_new(&self, source_id: &str, mut posts: Vec<Post>) -> Vec<Post> {
        if let Some(cursor) = self.cursor(source_id) {
            posts.retain(|p| p.id > cursor);
        }
        posts
    }

    /// Move the cursor to the largest id in `posts`. Never moves it back.
    pub fn advance(&mut self, source_id: &str, posts: &[Post]) {
        let Some(max_id) = posts.iter().map(|p| p.id).max() else {
            return;
        };
        let entry = self.cursors.entry(source_id.to_string()).or_insert(max_id);
        if max_id > *entry {
            *entry = max_id;
        }
    }

    /// Persist all cursors atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be serialized or written.
    pub fn save(&self) -> Result<(), StoreError> {
        write_json_atomic(&self.path, &self.cursors)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.cursors.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
