use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ErrorBody, SearchRequest, SearchResponse, SearchResult};
use crate::config::ApiKey;

const API_BASE: &str = "https://api.tavily.com";
pub const MAX_RESULTS: u8 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid Tavily API key: {0}")]
    Unauthorized(String),

    #[error("API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for the per-question web search.
/// Implemented by `TavilyClient` for production; mock implementations used in tests.
pub trait SearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Clone, Debug)]
pub struct TavilyClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl TavilyClient {
    pub fn new(http: Client, api_key: ApiKey) -> Self {
        Self {
            http,
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey::new("tvly-test"),
            base_url: base_url.to_string(),
        }
    }
}

impl SearchClient for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let request = SearchRequest {
            query,
            max_results: MAX_RESULTS,
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status.as_u16(), &text);
            warn!(error = %classified, "Tavily API error");
            return Err(classified);
        }

        let body: SearchResponse = response.json().await?;
        let results: Vec<SearchResult> = body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(SearchResult::from)
            .collect();

        debug!(results = results.len(), "tavily search complete");
        Ok(results)
    }
}

fn classify_status(code: u16, body: &str) -> SearchError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| d.error)
        .unwrap_or_else(|| {
            let end = body.floor_char_boundary(200);
            format!("HTTP {code}: {}", &body[..end])
        });

    match code {
        401 | 403 => SearchError::Unauthorized(message),
        429 => SearchError::RateLimited(message),
        _ => SearchError::Api { code, message },
    }
}
