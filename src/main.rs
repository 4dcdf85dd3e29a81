//! ainews - AI News Investigator
//!
//! A CLI tool that searches the web with Tavily for the latest AI news
//! and has Gemini write an opinionated Markdown briefing from the results.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing keys, no search results, model failure, I/O)
//!   2 - Report written, but some queries failed and --strict was set

mod cli;
mod config;
mod digest;
mod error;
mod llm;
mod models;
mod queries;
mod report;
mod search;

use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use digest::Pipeline;
use indicatif::{ProgressBar, ProgressStyle};
use llm::GeminiClient;
use search::TavilyClient;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let spinner = stage_spinner(args.quiet);
    init_logging(&args, &spinner);

    info!("ainews v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "Arguments: model={:?} queries={:?} format={:?} dry_run={} strict={}",
        args.model, args.queries, args.format, args.dry_run, args.strict
    );

    match run(args, spinner).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ainews.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize queries, model, and timeouts.");
    Ok(())
}

/// Stderr writer that clears the spinner while a log line is written.
#[derive(Clone)]
struct SpinnerAwareStderr(ProgressBar);

impl<'a> MakeWriter<'a> for SpinnerAwareStderr {
    type Writer = SpinnerAwareStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl io::Write for SpinnerAwareStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Initialize logging on stderr. `RUST_LOG` wins over -v/-q when set.
fn init_logging(args: &Args, spinner: &ProgressBar) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(SpinnerAwareStderr(spinner.clone()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Spinner on stderr showing the current stage. Not drawn until started.
fn stage_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb
}

/// Run one digest. Returns exit code (0 or 2).
async fn run(args: Args, spinner: ProgressBar) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let settings = config.digest_settings();

    if args.list_queries {
        for (i, query) in settings.queries.iter().enumerate() {
            println!("{:>2}. {}", i + 1, query);
        }
        return Ok(0);
    }

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!(
        "Report date {}, {} queries, {} results each",
        date,
        settings.queries.len(),
        settings.results_per_query
    );

    let search = TavilyClient::new(config.tavily_config())?;
    let model = GeminiClient::new(config.gemini_config())?;

    spinner.enable_steady_tick(Duration::from_millis(120));
    let mut pipeline = Pipeline::new(&search, &model, &settings, spinner.clone());

    if args.dry_run {
        let preview = pipeline
            .preview(args.tavily_api_key.as_deref(), date)
            .await;
        spinner.finish_and_clear();

        let preview = preview?;
        report::write_output(&report::generate_preview(&preview), args.output.as_deref())?;
        if !args.quiet {
            eprintln!("\n✅ Dry run complete. The model was not called.");
        }
        return Ok(0);
    }

    let result = pipeline
        .run(
            args.tavily_api_key.as_deref(),
            args.gemini_api_key.as_deref(),
            date,
        )
        .await;
    spinner.finish_and_clear();
    debug!("Pipeline finished in stage {}", pipeline.stage());
    let digest = result?;

    let output = report::render(&digest, args.format)?;
    report::write_output(&output, args.output.as_deref())?;

    if !args.quiet {
        eprintln!("\n{}", report::generate_run_summary(&digest));
        match args.output {
            Some(ref path) => eprintln!("✅ Report saved to: {}", path.display()),
            None => eprintln!("{}", models::Stage::Done.status_message()),
        }
    }

    if args.strict && digest.has_failures() {
        eprintln!(
            "\n⛔ {} of {} queries failed and --strict is set (exit code 2).",
            digest.failures.len(),
            digest.queries_run
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
