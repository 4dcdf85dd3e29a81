//! Tavily search API client.

use super::{SearchError, SearchProvider};
use crate::models::SearchResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the Tavily API.
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    /// Base URL, without the `/search` path.
    pub endpoint: String,
    /// `basic` or `advanced`.
    pub search_depth: String,
    pub timeout_seconds: u64,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com".to_string(),
            search_depth: "advanced".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
    include_images: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    url: String,
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST /search`.
pub struct TavilyClient {
    config: TavilyConfig,
    http_client: reqwest::Client,
}

impl TavilyClient {
    pub fn new(config: TavilyConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client for Tavily")?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        api_key: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/search", self.config.endpoint.trim_end_matches('/'));

        let request = TavilySearchRequest {
            query,
            max_results: limit,
            search_depth: &self.config.search_depth,
            include_answer: false,
            include_raw_content: false,
            include_images: false,
        };

        debug!("Tavily search: {:?} (max {})", query, limit);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    SearchError::Connect(self.config.endpoint.clone())
                } else {
                    SearchError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api { status, body });
        }

        let body: TavilySearchResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .take(limit)
            .map(|hit| SearchResult::new(hit.url, hit.content.unwrap_or_default()))
            .collect())
    }
}
