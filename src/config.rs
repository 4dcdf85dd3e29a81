//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ainews.toml` files. API keys are never read from or written to the
//! config file; they come from flags or the environment per run.

use crate::digest::DigestSettings;
use crate::llm::GeminiConfig;
use crate::queries::QuerySet;
use crate::search::TavilyConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = ".ainews.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// Tavily search settings and the query set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Tavily API base URL.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Results kept per query.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// `basic` or `advanced`.
    #[serde(default = "default_search_depth")]
    pub search_depth: String,

    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,

    /// Queries issued on every run, in order.
    #[serde(default)]
    pub queries: QuerySet,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            results_per_query: default_results_per_query(),
            search_depth: default_search_depth(),
            timeout_seconds: default_search_timeout(),
            queries: QuerySet::default(),
        }
    }
}

fn default_search_endpoint() -> String {
    TavilyConfig::default().endpoint
}

fn default_results_per_query() -> usize {
    2
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

fn default_search_timeout() -> u64 {
    30
}

/// Gemini settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub name: String,

    /// API base URL, including the version segment.
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            endpoint: default_model_endpoint(),
            temperature: default_temperature(),
            timeout_seconds: default_model_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_model_endpoint() -> String {
    GeminiConfig::default().endpoint
}

fn default_temperature() -> f32 {
    0.5
}

fn default_model_timeout() -> u64 {
    120
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_if_exists(Path::new(DEFAULT_CONFIG_FILE))
    }

    fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(k) = args.results_per_query {
            self.search.results_per_query = k;
        }
        if !args.queries.is_empty() {
            self.search.queries = QuerySet::new(args.queries.iter().cloned());
        }
    }

    /// Reject values that would make a run pointless.
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = self.search.queries.validate() {
            bail!("Invalid [search] queries: {}", e);
        }
        if self.search.results_per_query == 0 {
            bail!("[search] results_per_query must be at least 1");
        }
        if self.search.timeout_seconds == 0 {
            bail!("[search] timeout_seconds must be at least 1");
        }
        if self.model.timeout_seconds == 0 {
            bail!("[model] timeout_seconds must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            bail!("[model] temperature must be between 0.0 and 2.0");
        }
        Ok(())
    }

    pub fn tavily_config(&self) -> TavilyConfig {
        TavilyConfig {
            endpoint: self.search.endpoint.clone(),
            search_depth: self.search.search_depth.clone(),
            timeout_seconds: self.search.timeout_seconds,
        }
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            endpoint: self.model.endpoint.clone(),
            model: self.model.name.clone(),
            temperature: self.model.temperature,
            timeout_seconds: self.model.timeout_seconds,
        }
    }

    pub fn digest_settings(&self) -> DigestSettings {
        DigestSettings {
            queries: self.search.queries.clone(),
            results_per_query: self.search.results_per_query,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
