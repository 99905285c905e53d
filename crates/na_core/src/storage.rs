use async_trait::async_trait;

use crate::types::{AnalysisTask, CompanyAnalysisResult, CompanyReport, RunStage};
use crate::Result;

#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Looks up a finished result by company name (case and spacing insensitive).
    async fn get(&self, company: &str) -> Result<Option<CompanyAnalysisResult>>;

    /// Stores a finished result under the company name.
    async fn insert(&self, company: &str, result: CompanyAnalysisResult) -> Result<()>;

    /// Company names currently cached, most recently used first.
    async fn companies(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait TaskRegistry: Send + Sync {
    /// Registers a run for `task_id`.
    ///
    /// Returns `true` when the caller should start a new run and `false` when a
    /// run for the same id is already in flight.
    async fn begin(&self, task_id: &str, company: &str) -> Result<bool>;

    async fn advance(&self, task_id: &str, stage: RunStage) -> Result<()>;

    async fn complete(&self, task_id: &str, report: CompanyReport) -> Result<()>;

    /// Backends may forget finished tasks; in-flight ones are always kept.
    async fn get(&self, task_id: &str) -> Result<Option<AnalysisTask>>;
}
