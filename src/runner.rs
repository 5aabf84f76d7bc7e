//! Bounded search execution.

use futures::StreamExt;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::{
    CheckError, Result, SearchMode, SearchRequest, SearchResult, SessionAdapter, TweetRecord,
    TwitterSession,
};

/// Runs one search and collects its tweets.
///
/// Collection stops at `max_count` tweets, at the end of the stream, or when
/// the request deadline passes; all three are normal completions. The first
/// error item aborts the search and nothing collected so far is returned.
pub struct SearchRunner {
    mode: SearchMode,
}

impl SearchRunner {
    /// Creates a runner that asks for the latest tweets.
    pub fn new() -> Self {
        Self {
            mode: SearchMode::Latest,
        }
    }

    /// Returns the search mode used.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Runs `request` through `adapter`.
    pub async fn run<S: TwitterSession>(
        &self,
        adapter: &SessionAdapter<S>,
        request: &SearchRequest,
    ) -> Result<SearchResult> {
        // A deadline past what `Instant` can represent means no deadline.
        let deadline = Instant::now().checked_add(request.deadline);
        info!(
            "Searching for tweets with query: {} (max: {})",
            request.query, request.max_count
        );

        let mut stream = adapter.search(request, self.mode);
        let mut tweets = Vec::with_capacity(request.max_count.min(100));
        let mut deadline_reached = false;

        while tweets.len() < request.max_count {
            let next = match deadline {
                Some(deadline) => timeout_at(deadline, stream.next()).await,
                None => Ok(stream.next().await),
            };
            match next {
                Err(_) => {
                    warn!(
                        "Search deadline reached after {} tweets",
                        tweets.len()
                    );
                    deadline_reached = true;
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => return Err(CheckError::Search(Box::new(e))),
                Ok(Some(Ok(tweet))) => {
                    let record = TweetRecord::from(tweet);
                    debug!("Found tweet: @{}", record.username);
                    tweets.push(record);
                }
            }
        }

        Ok(SearchResult::completed(tweets, deadline_reached))
    }
}

impl Default for SearchRunner {
    fn default() -> Self {
        Self::new()
    }
}
