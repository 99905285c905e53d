use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use na_core::prelude::*;
use na_core::{AnalysisCache, TaskRegistry};
use na_storage::Storage;
use tracing::{error, info, warn};

use crate::company::NewsAnalyzer;

/// Outcome of asking for a company's analysis.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// A finished result was already cached.
    Cached {
        task_id: String,
        result: Box<CompanyAnalysisResult>,
    },
    /// A run is in flight; `started` is false when an earlier request started it.
    Processing { task_id: String, started: bool },
}

impl StartOutcome {
    pub fn task_id(&self) -> &str {
        match self {
            StartOutcome::Cached { task_id, .. } | StartOutcome::Processing { task_id, .. } => task_id,
        }
    }
}

/// Background analysis runs with result caching and task polling.
#[derive(Clone)]
pub struct AnalysisService {
    analyzer: Arc<NewsAnalyzer>,
    cache: Arc<dyn AnalysisCache>,
    tasks: Arc<dyn TaskRegistry>,
    models: BTreeMap<&'static str, String>,
}

impl fmt::Debug for AnalysisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisService")
            .field("analyzer", &self.analyzer)
            .field("models", &self.models)
            .finish()
    }
}

impl AnalysisService {
    pub fn new(
        analyzer: NewsAnalyzer,
        storage: Storage,
        models: BTreeMap<&'static str, String>,
    ) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            cache: storage.cache,
            tasks: storage.tasks,
            models,
        }
    }

    pub fn analyzer(&self) -> &NewsAnalyzer {
        &self.analyzer
    }

    /// Model names per capability, for health reporting.
    pub fn models(&self) -> &BTreeMap<&'static str, String> {
        &self.models
    }

    /// Returns the cached result or makes sure a run for the company is in
    /// flight. Concurrent requests for one company share a single run.
    pub async fn start_analysis(&self, company: &str) -> Result<StartOutcome> {
        let company = company.trim();
        if company.is_empty() {
            return Err(Error::InvalidCompanyName);
        }
        let task_id = task_id_for(company);

        if let Some(result) = self.cache.get(company).await? {
            info!("💾 Cache hit for {}", company);
            return Ok(StartOutcome::Cached {
                task_id,
                result: Box::new(result),
            });
        }

        if !self.tasks.begin(&task_id, company).await? {
            info!("⏳ Analysis for {} already running as {}", company, task_id);
            return Ok(StartOutcome::Processing {
                task_id,
                started: false,
            });
        }

        // A run may have finished between the cache lookup and `begin`.
        if let Some(result) = self.cache.get(company).await? {
            info!("💾 Cache filled for {} while starting", company);
            self.tasks
                .complete(&task_id, CompanyReport::Completed(Box::new(result.clone())))
                .await?;
            return Ok(StartOutcome::Cached {
                task_id,
                result: Box::new(result),
            });
        }

        self.spawn_run(company.to_string(), task_id.clone());
        Ok(StartOutcome::Processing {
            task_id,
            started: true,
        })
    }

    fn spawn_run(&self, company: String, task_id: String) {
        let analyzer = self.analyzer.clone();
        let cache = self.cache.clone();
        let tasks = self.tasks.clone();

        tokio::spawn(async move {
            let run = {
                let analyzer = analyzer.clone();
                let tasks = tasks.clone();
                let company = company.clone();
                let task_id = task_id.clone();
                tokio::spawn(async move {
                    analyzer
                        .analyze_tracked(&company, tasks.as_ref(), &task_id)
                        .await
                })
            };

            // A panicking run still completes its task with an error report.
            let report = match run.await {
                Ok(report) => report,
                Err(e) => {
                    error!("Error in background task for {}: {}", company, e);
                    CompanyReport::failed(&company, format!("Analysis failed: {}", e))
                }
            };

            if let Some(result) = report.result() {
                if let Err(e) = cache.insert(&company, result.clone()).await {
                    warn!("Could not cache analysis for {}: {}", company, e);
                }
            }
            if let Err(e) = tasks.complete(&task_id, report).await {
                error!("Could not complete task {}: {}", task_id, e);
            }
        });
    }

    pub async fn get_status(&self, task_id: &str) -> Result<AnalysisTask> {
        self.tasks
            .get(task_id)
            .await?
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    pub async fn list_cached_companies(&self) -> Result<Vec<String>> {
        self.cache.companies().await
    }

    /// Runs an analysis inline, bypassing tasks but still filling the cache.
    pub async fn analyze_now(&self, company: &str) -> Result<CompanyReport> {
        let company = company.trim();
        if company.is_empty() {
            return Err(Error::InvalidCompanyName);
        }
        if let Some(result) = self.cache.get(company).await? {
            return Ok(result.into());
        }
        let report = self.analyzer.analyze_company(company).await;
        if let Some(result) = report.result() {
            self.cache.insert(company, result.clone()).await?;
        }
        Ok(report)
    }
}
