use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: u8,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Option<Vec<RawResult>>,
}

/// Result record as returned on the wire. Any field may be absent.
#[derive(Debug, Deserialize)]
pub struct RawResult {
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

/// Error body: `{"detail": {"error": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub error: Option<String>,
}

/// One web search hit. Fields missing from the API response are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl From<RawResult> for SearchResult {
    fn from(raw: RawResult) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        }
    }
}
