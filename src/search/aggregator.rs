//! Query aggregation.
//!
//! Runs every query in the set, one after another, and folds the results
//! into a single [`SearchContext`]. A failing query is logged and recorded
//! but never stops the loop.

use super::SearchProvider;
use crate::models::{QueryFailure, SearchContext};
use crate::queries::QuerySet;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Everything gathered by the search stage.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub context: SearchContext,
    pub failures: Vec<QueryFailure>,
    pub queries_run: usize,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

/// Issue each query in order and collect deduplicated results.
pub async fn aggregate(
    queries: &QuerySet,
    provider: &dyn SearchProvider,
    api_key: &str,
    limit: usize,
    progress: &ProgressBar,
) -> Aggregation {
    let mut aggregation = Aggregation::default();
    let total = queries.len();

    for (i, query) in queries.iter().enumerate() {
        progress.set_message(format!("🔍 [{}/{}] {}", i + 1, total, query));
        aggregation.queries_run += 1;

        match provider.search(query, api_key, limit).await {
            Ok(results) => {
                let returned = results.len();
                let mut added = 0;
                for result in results {
                    if aggregation.context.push(result) {
                        added += 1;
                    }
                }
                debug!(
                    "{} query {:?}: {} results, {} new",
                    provider.name(),
                    query,
                    returned,
                    added
                );
            }
            Err(e) => {
                warn!("Search error for {:?}: {}", query, e);
                aggregation.failures.push(QueryFailure {
                    query: query.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Collected {} unique sources from {} queries ({} failed)",
        aggregation.context.len(),
        aggregation.queries_run,
        aggregation.failures.len()
    );

    aggregation
}
