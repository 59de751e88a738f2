//! Feed collaborator: fetches recent posts from public channel preview pages.

pub mod client;
pub mod error;
pub mod parse;

mod rate_limit;

pub use client::PreviewClient;
pub use error::ScraperError;
pub use parse::parse_preview_html;
