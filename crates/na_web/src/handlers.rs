use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use na_core::{CompanyReport, Error, RunStage};
use na_scrapers::StartOutcome;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::AppState;

/// Maps service errors onto HTTP statuses with a `{"detail": ...}` body.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidCompanyName => StatusCode::BAD_REQUEST,
            Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
            other => {
                error!("Request failed: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    pub company_name: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    pub task_id: String,
    pub message: String,
    pub data: Option<CompanyReport>,
}

#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub status: &'static str,
    pub task_id: String,
    pub completed: bool,
    pub stage: RunStage,
    pub data: Option<CompanyReport>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub models_loaded: bool,
    pub models: BTreeMap<&'static str, String>,
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "News Analyzer API is running" }))
}

pub async fn analyze_company(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let company = request.company_name.trim().to_string();
    let response = match state.service.start_analysis(&company).await? {
        StartOutcome::Cached { task_id, result } => AnalysisResponse {
            status: "success",
            task_id,
            message: "Analysis found in cache".to_string(),
            data: Some(CompanyReport::Completed(result)),
        },
        StartOutcome::Processing { task_id, started } => AnalysisResponse {
            status: "processing",
            task_id,
            message: if started {
                format!("Analysis started for {}", company)
            } else {
                format!("Analysis already in progress for {}", company)
            },
            data: None,
        },
    };
    Ok(Json(response))
}

pub async fn task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let task = state.service.get_status(&task_id).await?;
    let status = match &task.report {
        _ if !task.completed => "processing",
        Some(report) if report.error().is_some() => "failed",
        _ => "completed",
    };
    Ok(Json(TaskStatusResponse {
        status,
        task_id: task.task_id,
        completed: task.completed,
        stage: task.stage,
        data: task.report,
    }))
}

pub async fn available_companies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let companies = state.service.list_cached_companies().await?;
    Ok(Json(json!({ "companies": companies })))
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: true,
        models: state.service.models().clone(),
    })
}
