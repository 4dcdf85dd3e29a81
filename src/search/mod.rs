//! Web search: the provider seam, the Tavily client, and the aggregator
//! that turns a query set into one deduplicated context.

pub mod aggregator;
pub mod tavily;

pub use aggregator::{aggregate, Aggregation};
pub use tavily::{TavilyClient, TavilyConfig};

use crate::models::SearchResult;
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a search provider for a single query.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to search provider at {0}")]
    Connect(String),

    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Search API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// A web search backend.
///
/// Takes the credential per call so nothing secret is held longer than
/// a single run.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Run one query and return up to `limit` results in provider order.
    async fn search(
        &self,
        query: &str,
        api_key: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError>;
}
