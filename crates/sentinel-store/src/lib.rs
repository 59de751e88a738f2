//! Small on-disk state for the sentinel: per-channel cursors and the
//! baseline table, plus the offline job that learns baselines from a corpus.

pub mod baseline;
pub mod build;
pub mod cursor;
pub mod error;

mod fs;

pub use baseline::{BaselineFile, BaselineProvider};
pub use build::{compute_baselines, fetch_corpus_shard, CorpusItem};
pub use cursor::CursorStore;
pub use error::StoreError;
