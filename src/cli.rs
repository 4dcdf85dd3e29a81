//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// ainews - a sharp-tongued daily AI news digest
///
/// Searches the web with Tavily for the latest AI news, then has Gemini
/// write an opinionated Markdown briefing from the results.
///
/// Examples:
///   ainews --tavily-api-key tvly-... --gemini-api-key AIza...
///   TAVILY_API_KEY=... GOOGLE_API_KEY=... ainews -o today.md
///   ainews --query "open-weight model releases" --query "AI chip export rules"
///   ainews --dry-run
///   ainews --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Tavily search API key
    #[arg(long, value_name = "KEY", env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    /// Google Gemini API key
    #[arg(long, value_name = "KEY", env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model to write the report
    ///
    /// Defaults to gemini-2.0-flash, or the value in .ainews.toml.
    #[arg(short, long, value_name = "NAME", env = "AINEWS_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature for the report (0.0 - 2.0)
    #[arg(long, value_name = "TEMP")]
    pub temperature: Option<f32>,

    /// Number of search results to keep per query
    #[arg(short = 'k', long, value_name = "COUNT")]
    pub results_per_query: Option<usize>,

    /// Search query to run instead of the built-in set (repeatable)
    #[arg(long = "query", value_name = "TEXT")]
    pub queries: Vec<String>,

    /// Date to write the report for (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ainews.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Model request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Exit with code 2 if any search query failed
    #[arg(long)]
    pub strict: bool,

    /// Run the searches and print the model request without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Print the effective query set and exit
    #[arg(long)]
    pub list_queries: bool,

    /// Generate a default .ainews.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// The model's Markdown, unchanged (default)
    #[default]
    Markdown,
    /// Report plus run metadata as JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if self.results_per_query == Some(0) {
            return Err("Results per query must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.queries.iter().any(|q| q.trim().is_empty()) {
            return Err("--query must not be empty".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
