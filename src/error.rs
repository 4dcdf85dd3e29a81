//! Terminal errors of a digest run.
//!
//! A failed search query is not in here: it is recorded as a
//! [`crate::models::QueryFailure`] and the run carries on.

use crate::llm::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    /// One or both API keys were not supplied. Raised before any network call.
    #[error("Missing API key(s): {}. Pass them as flags or environment variables.", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    /// Every query failed or returned nothing.
    #[error("No news found: {queries} queries returned no results ({failed} failed)")]
    NoResults { queries: usize, failed: usize },

    /// The model call failed. Not retried.
    #[error("Report generation failed: {0}")]
    Synthesis(#[from] ModelError),
}
