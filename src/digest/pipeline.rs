//! The digest pipeline: search, then synthesize.
//!
//! Stages run strictly in order and each run owns all of its state. API
//! keys come in as arguments and are dropped when the run ends.

use super::prompt::build_request;
use crate::error::DigestError;
use crate::llm::{LanguageModel, ModelRequest};
use crate::models::{Digest, Stage};
use crate::queries::QuerySet;
use crate::search::{aggregate, Aggregation, SearchProvider};
use chrono::{NaiveDate, Utc};
use indicatif::ProgressBar;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// What to search for and how much.
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub queries: QuerySet,
    pub results_per_query: usize,
}

/// The two API keys for one run.
pub struct Credentials {
    search_api_key: String,
    model_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("search_api_key", &"<redacted>")
            .field("model_api_key", &"<redacted>")
            .finish()
    }
}

/// A key counts as present when it is non-blank.
fn present(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}

impl Credentials {
    /// Check that both keys are present.
    pub fn resolve(
        search_api_key: Option<&str>,
        model_api_key: Option<&str>,
    ) -> Result<Self, DigestError> {
        match (present(search_api_key), present(model_api_key)) {
            (Some(search), Some(model)) => Ok(Self {
                search_api_key: search.to_string(),
                model_api_key: model.to_string(),
            }),
            (search, model) => {
                let mut missing = Vec::new();
                if search.is_none() {
                    missing.push("Tavily API key");
                }
                if model.is_none() {
                    missing.push("Gemini API key");
                }
                Err(DigestError::MissingCredentials(missing))
            }
        }
    }
}

/// Output of a dry run: what the model would have been sent.
#[derive(Debug)]
pub struct Preview {
    pub aggregation: Aggregation,
    pub request: ModelRequest,
}

/// Drives one digest run against a search provider and a model.
pub struct Pipeline<'a> {
    search: &'a dyn SearchProvider,
    model: &'a dyn LanguageModel,
    settings: &'a DigestSettings,
    progress: ProgressBar,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        search: &'a dyn SearchProvider,
        model: &'a dyn LanguageModel,
        settings: &'a DigestSettings,
        progress: ProgressBar,
    ) -> Self {
        progress.set_message(Stage::Idle.status_message());
        Self {
            search,
            model,
            settings,
            progress,
            stage: Stage::Idle,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Stage: {} -> {}", self.stage, stage);
        self.stage = stage;
        self.progress.set_message(stage.status_message());
    }

    /// Run the whole pipeline and return the digest.
    pub async fn run(
        &mut self,
        search_api_key: Option<&str>,
        model_api_key: Option<&str>,
        date: NaiveDate,
    ) -> Result<Digest, DigestError> {
        match self.run_stages(search_api_key, model_api_key, date).await {
            Ok(digest) => {
                self.enter(Stage::Done);
                Ok(digest)
            }
            Err(e) => {
                debug!("Digest run failed during {}: {}", self.stage, e);
                self.enter(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &mut self,
        search_api_key: Option<&str>,
        model_api_key: Option<&str>,
        date: NaiveDate,
    ) -> Result<Digest, DigestError> {
        let start_time = Instant::now();
        let credentials = Credentials::resolve(search_api_key, model_api_key)?;

        let aggregation = self.gather(&credentials.search_api_key).await?;

        self.enter(Stage::Synthesizing);
        let request = build_request(date, &aggregation.context);
        info!(
            "Requesting report from {} with {} sources",
            self.model.model_name(),
            aggregation.context.len()
        );
        let report = self
            .model
            .generate(&request, &credentials.model_api_key)
            .await?;

        Ok(Digest {
            report,
            date,
            generated_at: Utc::now(),
            model: self.model.model_name().to_string(),
            sources: aggregation.context.sources(),
            queries_run: aggregation.queries_run,
            failures: aggregation.failures,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Run only the search stage and build the model request without
    /// sending it. Needs just the search key.
    pub async fn preview(
        &mut self,
        search_api_key: Option<&str>,
        date: NaiveDate,
    ) -> Result<Preview, DigestError> {
        let result = match present(search_api_key) {
            Some(key) => self.gather(key).await,
            None => Err(DigestError::MissingCredentials(vec!["Tavily API key"])),
        };

        match result {
            Ok(aggregation) => {
                let request = build_request(date, &aggregation.context);
                self.enter(Stage::Done);
                Ok(Preview {
                    aggregation,
                    request,
                })
            }
            Err(e) => {
                self.enter(Stage::Failed);
                Err(e)
            }
        }
    }

    async fn gather(&mut self, search_api_key: &str) -> Result<Aggregation, DigestError> {
        self.enter(Stage::Searching);
        let aggregation = aggregate(
            &self.settings.queries,
            self.search,
            search_api_key,
            self.settings.results_per_query,
            &self.progress,
        )
        .await;

        if aggregation.is_empty() {
            return Err(DigestError::NoResults {
                queries: aggregation.queries_run,
                failed: aggregation.failures.len(),
            });
        }
        Ok(aggregation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelError;
    use crate::models::SearchResult;
    use crate::search::SearchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns one result per query (URL = query), fails on queries
    /// starting with "fail", returns nothing for queries starting with "none".
    #[derive(Default)]
    struct StubSearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        fn name(&self) -> &str {
            "stub"
        }

        async fn search(
            &self,
            query: &str,
            _api_key: &str,
            _limit: usize,
        ) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.starts_with("fail") {
                return Err(SearchError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            if query.starts_with("none") {
                return Ok(vec![]);
            }
            Ok(vec![SearchResult::new(query, format!("about {query}"))])
        }
    }

    struct StubModel {
        calls: AtomicUsize,
        fail: bool,
        last_request: Mutex<Option<(ModelRequest, String)>>,
    }

    impl StubModel {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                last_request: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        fn model_name(&self) -> &str {
            "stub-model"
        }

        async fn generate(
            &self,
            request: &ModelRequest,
            api_key: &str,
        ) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((request.clone(), api_key.to_string()));
            if self.fail {
                return Err(ModelError::Api {
                    status: 403,
                    body: "API key not valid".to_string(),
                });
            }
            Ok("# 📰 report".to_string())
        }
    }

    fn settings(queries: &[&str]) -> DigestSettings {
        DigestSettings {
            queries: QuerySet::new(queries.iter().copied()),
            results_per_query: 2,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    #[test]
    fn test_new_pipeline_shows_idle_status() {
        let search = StubSearch::default();
        let model = StubModel::ok();
        let settings = settings(&["q1"]);
        let progress = ProgressBar::hidden();
        let pipeline = Pipeline::new(&search, &model, &settings, progress.clone());

        assert_eq!(pipeline.stage(), Stage::Idle);
        assert_eq!(progress.message(), Stage::Idle.status_message());
    }

    #[tokio::test]
    async fn test_successful_run() {
        let search = StubSearch::default();
        let model = StubModel::ok();
        let settings = settings(&["q1", "q2"]);
        let mut pipeline = Pipeline::new(&search, &model, &settings, ProgressBar::hidden());

        let digest = pipeline
            .run(Some("tvly"), Some("gem"), date())
            .await
            .unwrap();

        assert_eq!(pipeline.stage(), Stage::Done);
        assert_eq!(digest.report, "# 📰 report");
        assert_eq!(digest.model, "stub-model");
        assert_eq!(digest.sources, vec!["q1", "q2"]);
        assert_eq!(digest.queries_run, 2);
        assert!(!digest.has_failures());

        let (request, key) = model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(key, "gem");
        assert!(request.user.starts_with("今日の日付: 2026-10-15\n\n"));
        assert!(request.user.contains("Source: q1\nContent: about q1\n\n"));
    }

    #[tokio::test]
    async fn test_missing_credentials_invokes_nothing() {
        let search = StubSearch::default();
        let model = StubModel::ok();
        let settings = settings(&["q1"]);

        for (s, m) in [(None, Some("gem")), (Some("tvly"), None), (Some("  "), Some(""))] {
            let mut pipeline = Pipeline::new(&search, &model, &settings, ProgressBar::hidden());
            let err = pipeline.run(s, m, date()).await.unwrap_err();
            assert!(matches!(err, DigestError::MissingCredentials(_)));
            assert_eq!(pipeline.stage(), Stage::Failed);
        }

        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_credentials_lists_both() {
        let err = Credentials::resolve(None, None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Tavily API key"));
        assert!(message.contains("Gemini API key"));
    }

    #[tokio::test]
    async fn test_no_results_never_calls_model() {
        let search = StubSearch::default();
        let model = StubModel::ok();
        let settings = settings(&["fail-1", "none-2", "fail-3"]);
        let mut pipeline = Pipeline::new(&search, &model, &settings, ProgressBar::hidden());

        let err = pipeline
            .run(Some("tvly"), Some("gem"), date())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DigestError::NoResults {
                queries: 3,
                failed: 2
            }
        ));
        assert_eq!(search.calls.load(Ordering::SeqCst), 3);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.stage(), Stage::Failed);
    }

    #[tokio::test]
    async fn test_one_failed_query_is_not_fatal() {
        let search = StubSearch::default();
        let model = StubModel::ok();
        let settings = settings(&["fail-first", "works"]);
        let mut pipeline = Pipeline::new(&search, &model, &settings, ProgressBar::hidden());

        let digest = pipeline
            .run(Some("tvly"), Some("gem"), date())
            .await
            .unwrap();

        assert_eq!(digest.sources, vec!["works"]);
        assert_eq!(digest.failures.len(), 1);
        assert_eq!(digest.failures[0].query, "fail-first");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_error_is_synthesis_failure() {
        let search = StubSearch::default();
        let model = StubModel::failing();
        let settings = settings(&["q1"]);
        let mut pipeline = Pipeline::new(&search, &model, &settings, ProgressBar::hidden());

        let err = pipeline
            .run(Some("tvly"), Some("gem"), date())
            .await
            .unwrap_err();

        assert!(matches!(err, DigestError::Synthesis(_)));
        assert!(err.to_string().contains("API key not valid"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.stage(), Stage::Failed);
    }

    #[tokio::test]
    async fn test_preview_skips_model() {
        let search = StubSearch::default();
        let model = StubModel::ok();
        let settings = settings(&["q1"]);
        let mut pipeline = Pipeline::new(&search, &model, &settings, ProgressBar::hidden());

        let preview = pipeline.preview(Some("tvly"), date()).await.unwrap();

        assert_eq!(preview.aggregation.context.len(), 1);
        assert!(preview.request.system.contains("2026-10-15"));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = Credentials::resolve(Some("tvly-secret"), Some("gem-secret")).unwrap();
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("secret"));
    }
}
