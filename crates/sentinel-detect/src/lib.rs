//! Spike detection over one polling window.
//!
//! Posts are normalized, stripped of stale and duplicate content, matched
//! against the watched vocabulary, counted per pattern, and compared with the
//! learned hourly baselines. Everything here is pure: fetching posts, loading
//! baselines and delivering alerts live in the collaborator crates.

pub mod aggregate;
pub mod alert;
pub mod baseline;
pub mod composite;
pub mod matcher;
pub mod pipeline;
pub mod spike;
pub mod stale;
pub mod types;

pub use aggregate::{aggregate, Batch};
pub use alert::{build_payload, AlertPayload, Citation, MAX_CITATIONS};
pub use baseline::BaselineTable;
pub use composite::build_patterns;
pub use matcher::{matches, TermMatcher, Vocabulary};
pub use sentinel_core::normalize;
pub use pipeline::{Detector, WindowReport};
pub use spike::{detect_spikes, SpikeThresholds};
pub use stale::StaleFilter;
pub use types::{Alert, BatchCounts, Pattern, Post};
