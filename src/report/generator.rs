//! Report output.
//!
//! The model's Markdown is written as-is. JSON wraps it with the run
//! metadata. Status summaries go to stderr so stdout stays pipeable.

use crate::cli::OutputFormat;
use crate::digest::pipeline::Preview;
use crate::models::Digest;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Render the digest in the requested format.
pub fn render(digest: &Digest, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_markdown_report(digest)),
        OutputFormat::Json => generate_json_report(digest),
    }
}

/// The report text, unchanged apart from a guaranteed trailing newline.
pub fn generate_markdown_report(digest: &Digest) -> String {
    let mut output = digest.report.clone();
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Generate a JSON report.
pub fn generate_json_report(digest: &Digest) -> Result<String> {
    serde_json::to_string_pretty(digest).map_err(Into::into)
}

/// Write rendered output to a file, or stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write report to stdout")
        }
    }
}

/// Short human summary of a finished run.
pub fn generate_run_summary(digest: &Digest) -> String {
    let mut summary = String::new();

    summary.push_str("📊 Run Summary:\n");
    summary.push_str(&format!("   Date: {}\n", digest.date.format("%Y-%m-%d")));
    summary.push_str(&format!("   Model: {}\n", digest.model));
    summary.push_str(&format!(
        "   Sources: {} unique from {} queries\n",
        digest.sources.len(),
        digest.queries_run
    ));
    if digest.has_failures() {
        summary.push_str(&format!(
            "   ⚠️  {} of {} queries failed:\n",
            digest.failures.len(),
            digest.queries_run
        ));
        for failure in &digest.failures {
            summary.push_str(&format!("     - {}: {}\n", failure.query, failure.error));
        }
    }
    summary.push_str(&format!("   Duration: {:.1}s\n", digest.duration_seconds));

    summary
}

/// Dry-run output: the exact request the model would receive.
pub fn generate_preview(preview: &Preview) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "=== SOURCES ({}) ===\n",
        preview.aggregation.context.len()
    ));
    for url in preview.aggregation.context.sources() {
        output.push_str(&format!("- {}\n", url));
    }
    if !preview.aggregation.failures.is_empty() {
        output.push_str(&format!(
            "\n=== FAILED QUERIES ({}) ===\n",
            preview.aggregation.failures.len()
        ));
        for failure in &preview.aggregation.failures {
            output.push_str(&format!("- {}: {}\n", failure.query, failure.error));
        }
    }
    output.push_str("\n=== SYSTEM ===\n");
    output.push_str(&preview.request.system);
    output.push_str("\n=== USER ===\n");
    output.push_str(&preview.request.user);

    output
}
