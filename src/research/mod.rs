//! Research pipeline: question generation, per-question web search, and report compilation,
//! driven by an explicit state machine.

pub(crate) mod agent;
pub(crate) mod questions;
pub(crate) mod report;

pub use agent::{Event, Phase, ResearchAgent};
pub use report::Report;

use crate::openai::CompletionError;
use crate::tavily::{SearchError, SearchResult};

/// The two failure kinds a research run can hit. Both are shown to the user and the run
/// carries on with an empty result for the failed step.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("Error with OpenAI: {0}")]
    Completion(#[from] CompletionError),

    #[error("Web search error: {0}")]
    Search(#[from] SearchError),
}

/// Ordered question → results mapping.
///
/// Keeps insertion order. Re-inserting a question replaces its results in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QnaMap {
    entries: Vec<(String, Vec<SearchResult>)>,
}

impl QnaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: String, results: Vec<SearchResult>) {
        match self.entries.iter_mut().find(|(q, _)| *q == question) {
            Some((_, existing)) => *existing = results,
            None => self.entries.push((question, results)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SearchResult])> {
        self.entries.iter().map(|(q, r)| (q.as_str(), r.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
