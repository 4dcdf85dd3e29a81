//! Data models for the news digest.
//!
//! Everything here lives for a single run: search results, the
//! deduplicated context handed to the model, and the final digest.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single hit returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub content: String,
}

impl SearchResult {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: content.into(),
        }
    }
}

/// Search results deduplicated by URL, in first-seen order.
///
/// Rendered as one `Source: ...\nContent: ...` block per result, which is
/// the text the model receives.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    results: Vec<SearchResult>,
    seen: HashSet<String>,
}

impl SearchContext {
    /// Append a result unless its URL is already present.
    ///
    /// Returns `true` if the result was added.
    pub fn push(&mut self, result: SearchResult) -> bool {
        if !self.seen.insert(result.url.clone()) {
            return false;
        }
        self.results.push(result);
        true
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// URLs in the order they were first seen.
    pub fn sources(&self) -> Vec<String> {
        self.results().iter().map(|r| r.url.clone()).collect()
    }

    /// Render the context text sent to the model.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for result in self.results() {
            text.push_str(&format!(
                "Source: {}\nContent: {}\n\n",
                result.url, result.content
            ));
        }
        text
    }
}

/// A search query that failed. Non-fatal; kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub query: String,
    pub error: String,
}

/// Stage of a digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Searching,
    Synthesizing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "Idle"),
            Stage::Searching => write!(f, "Searching"),
            Stage::Synthesizing => write!(f, "Synthesizing"),
            Stage::Done => write!(f, "Done"),
            Stage::Failed => write!(f, "Failed"),
        }
    }
}

impl Stage {
    /// Status line shown while the stage is active.
    pub fn status_message(&self) -> &'static str {
        match self {
            Stage::Idle => "Waiting to start",
            Stage::Searching => "🔍 Searching the web for the latest AI news...",
            Stage::Synthesizing => "🤖 The consultant is analysing sources and writing the report...",
            Stage::Done => "✅ Investigation complete!",
            Stage::Failed => "❌ Investigation failed",
        }
    }
}

/// The result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    /// Report text exactly as returned by the model.
    pub report: String,
    /// Date the report was written for.
    pub date: NaiveDate,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Model identifier used for synthesis.
    pub model: String,
    /// Source URLs handed to the model, in context order.
    pub sources: Vec<String>,
    /// Number of queries issued.
    pub queries_run: usize,
    /// Queries whose search call failed.
    pub failures: Vec<QueryFailure>,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

impl Digest {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_first_occurrence_wins() {
        let mut context = SearchContext::default();
        assert!(context.push(SearchResult::new("a", "X")));
        assert!(!context.push(SearchResult::new("a", "Y")));
        assert!(context.push(SearchResult::new("b", "Z")));

        assert_eq!(context.len(), 2);
        assert_eq!(context.results()[0].content, "X");
        assert_eq!(context.sources(), vec!["a", "b"]);
    }

    #[test]
    fn test_context_render() {
        let mut context = SearchContext::default();
        context.push(SearchResult::new("https://a.example", "first"));
        context.push(SearchResult::new("https://b.example", "second"));

        assert_eq!(
            context.render(),
            "Source: https://a.example\nContent: first\n\n\
             Source: https://b.example\nContent: second\n\n"
        );
    }

    #[test]
    fn test_empty_context_renders_nothing() {
        let context = SearchContext::default();
        assert!(context.is_empty());
        assert_eq!(context.render(), "");
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        let json = serde_json::to_string(&Stage::Synthesizing).unwrap();
        assert_eq!(json, "\"synthesizing\"");
    }
}
