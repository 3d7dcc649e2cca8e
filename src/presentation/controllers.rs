//! Scan API controllers

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use tracing::{debug, error, warn};

use crate::application::{ScanPipeline, ScanPipelineError};
use crate::domain::{ReportParseError, ScanJob, ScanStage, SourceKind};
use crate::presentation::models::{
    ErrorResponse, FindingDto, HealthResponse, MessageResponse, ScanRequest, ScanResponse,
};

/// Success message attached to every completed scan.
const SCAN_COMPLETED_MESSAGE: &str = "Scan completed successfully.";

/// Informational message for the unimplemented archive path.
const ZIP_NOT_IMPLEMENTED_MESSAGE: &str = "ZIP file handling not implemented yet.";

// Client-facing failure messages are fixed per error category. The detailed
// error chain stays in the server logs.
const INVALID_BODY_MESSAGE: &str = "Invalid request body.";
const EMPTY_VALUE_MESSAGE: &str = "Request value must not be empty.";
const WORKSPACE_FAILED_MESSAGE: &str = "Failed to create temporary directory";
const CLONE_FAILED_MESSAGE: &str = "Failed to clone repository";
const SCANNER_FAILED_MESSAGE: &str = "Failed to run security scanner.";
const REPORT_READ_FAILED_MESSAGE: &str = "Failed to read scan report.";
const REPORT_DECODE_FAILED_MESSAGE: &str = "Failed to parse scan report.";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ScanPipeline,
}

/// POST /v1/scan - Run a synchronous secret scan against a repository
#[utoipa::path(
    post,
    path = "/v1/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan completed", body = ScanResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 500, description = "Scan pipeline failure", body = ErrorResponse)
    ),
    tag = "scan"
)]
pub async fn scan(
    State(state): State<AppState>,
    request: Result<Json<ScanRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(json) => json,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed scan request");
            return error_response(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE);
        }
    };

    if request.value.trim().is_empty() {
        warn!(kind = %request.kind, "Rejected scan request with empty value");
        return error_response(StatusCode::BAD_REQUEST, EMPTY_VALUE_MESSAGE);
    }

    match request.kind {
        SourceKind::Url => scan_repository(state, request.value).await,
        SourceKind::Archive => {
            debug!("Archive scan requested; not implemented");
            (
                StatusCode::OK,
                Json(MessageResponse {
                    message: ZIP_NOT_IMPLEMENTED_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn scan_repository(state: AppState, repository_url: String) -> Response {
    let mut job = ScanJob::new(repository_url);

    match state.pipeline.execute(&mut job).await {
        Ok(findings) => {
            let response = ScanResponse {
                message: SCAN_COMPLETED_MESSAGE.to_string(),
                findings: findings.into_iter().map(FindingDto::from).collect(),
            };

            if let Err(e) = job.transition(ScanStage::Responded, Some("Response serialized".into()))
            {
                warn!(scan_id = %job.scan_id, error = %e, "Could not record response transition");
            }
            debug!(
                scan_id = %job.scan_id,
                transition_count = job.transitions.len(),
                "Scan lifecycle complete"
            );

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(pipeline_error) => {
            error!(scan_id = %job.scan_id, error = %pipeline_error, "Scan request failed");
            let (status, message) = map_pipeline_error(&pipeline_error);
            error_response(status, message)
        }
    }
}

/// Map a pipeline error onto its status code and fixed client message.
fn map_pipeline_error(error: &ScanPipelineError) -> (StatusCode, &'static str) {
    match error {
        ScanPipelineError::Workspace(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, WORKSPACE_FAILED_MESSAGE)
        }
        ScanPipelineError::Fetch(_) => (StatusCode::INTERNAL_SERVER_ERROR, CLONE_FAILED_MESSAGE),
        ScanPipelineError::ScanExecution(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, SCANNER_FAILED_MESSAGE)
        }
        ScanPipelineError::Report(ReportParseError::Read { .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, REPORT_READ_FAILED_MESSAGE)
        }
        ScanPipelineError::Report(ReportParseError::Decode { .. }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            REPORT_DECODE_FAILED_MESSAGE,
        ),
        ScanPipelineError::Transition(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET /health - Service liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}
