//! Web search client returning title/content/url records per query.

pub mod client;
pub mod types;

pub use client::{SearchClient, SearchError, TavilyClient};
pub use types::SearchResult;
