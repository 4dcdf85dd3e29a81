//! The fixed set of search queries that drives each digest.
//!
//! Changing what the digest investigates means editing this list (or
//! overriding it in `.ainews.toml` / with `--query`).

use serde::{Deserialize, Serialize};

/// Queries issued on every run unless overridden.
pub const DEFAULT_QUERIES: [&str; 6] = [
    // General: anything released in the last day
    "Generative AI new models release last 24 hours",
    // Vendor competition
    "OpenAI Anthropic Google Microsoft AI news latest",
    "Video generation AI new tools latest",
    "Image generation AI latest trends",
    // Niche tools
    "Lesser known AI tools new release",
    "Innovative AI tools for creative workflow",
];

/// An ordered, immutable list of search queries.
///
/// Entries are trimmed on construction, including when read from a
/// config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct QuerySet(Vec<String>);

impl From<Vec<String>> for QuerySet {
    fn from(queries: Vec<String>) -> Self {
        Self::new(queries)
    }
}

impl From<QuerySet> for Vec<String> {
    fn from(set: QuerySet) -> Self {
        set.0
    }
}

impl Default for QuerySet {
    fn default() -> Self {
        Self(DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect())
    }
}

impl QuerySet {
    /// Build a query set from arbitrary strings, trimming each entry.
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            queries
                .into_iter()
                .map(|q| q.into().trim().to_string())
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that the set is usable: at least one query, none blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("Query set must contain at least one query".to_string());
        }
        if let Some(pos) = self.0.iter().position(|q| q.trim().is_empty()) {
            return Err(format!("Query #{} is blank", pos + 1));
        }
        Ok(())
    }
}
