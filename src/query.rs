//! Search request representation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CheckError, Result};

/// Default result count.
pub const DEFAULT_MAX_COUNT: usize = 10;

/// Default time budget for a single search.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5 * 60);

/// Ordering of search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Relevance ranked.
    #[default]
    Top,
    /// Chronological, newest first.
    Latest,
}

impl SearchMode {
    /// Returns the `product` value the search timeline expects.
    pub fn product(self) -> &'static str {
        match self {
            SearchMode::Top => "Top",
            SearchMode::Latest => "Latest",
        }
    }
}

/// A bounded search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// The search terms.
    pub query: String,
    /// Maximum number of tweets to collect.
    pub max_count: usize,
    /// Time budget measured from the start of the search.
    pub deadline: Duration,
}

impl SearchRequest {
    /// Creates a request with the default deadline.
    ///
    /// The query must be non-empty and `max_count` positive.
    pub fn new(query: impl Into<String>, max_count: usize) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(CheckError::InvalidRequest("Query cannot be empty".into()));
        }
        if max_count == 0 {
            return Err(CheckError::InvalidRequest(
                "Result count must be positive".into(),
            ));
        }

        Ok(Self {
            query,
            max_count,
            deadline: DEFAULT_DEADLINE,
        })
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}
