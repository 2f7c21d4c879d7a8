use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use coach_common::{Submission, TestCase};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub code: String,
    pub test_cases: Vec<TestCaseInput>,
}

#[derive(Debug, Deserialize)]
pub struct TestCaseInput {
    pub input: String,
    pub expected: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    pub results: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn client_error(message: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /evaluate - compile a submission and judge it against its
/// test cases.
///
/// A submission the toolchain rejects is a normal 200 response with
/// `compiled=false`; only faults in the judge itself become a 500.
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvaluateRequest>,
) -> impl IntoResponse {
    if payload.code.trim().is_empty() {
        return client_error("'code' must be a non-empty string");
    }
    if payload.code.len() > state.max_source_bytes {
        return client_error(format!(
            "'code' exceeds the maximum size of {} bytes",
            state.max_source_bytes
        ));
    }

    let request_id = Uuid::new_v4();
    let submission = Submission {
        code: payload.code,
        test_cases: payload
            .test_cases
            .into_iter()
            .map(|tc| TestCase {
                input: tc.input,
                expected: tc.expected,
            })
            .collect(),
    };

    info!(
        request_id = %request_id,
        test_cases = submission.test_cases.len(),
        source_bytes = submission.code.len(),
        "evaluation request accepted"
    );

    // Bound host CPU and process-table pressure; the permit is held
    // for the whole evaluation.
    let _permit = match state.eval_limiter.acquire().await {
        Ok(permit) => permit,
        Err(_) => {
            error!(request_id = %request_id, "evaluation limiter closed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "server is shutting down".into(),
                }),
            )
                .into_response();
        }
    };

    match state.judge.evaluate(&submission).await {
        Ok(report) => {
            info!(
                request_id = %request_id,
                compiled = report.compiled,
                tests = report.test_results.len(),
                passed = report.test_results.iter().filter(|r| r.passed).count(),
                total_ms = report.total_execution_time_ms,
                "evaluation finished"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "evaluation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!("internal evaluation failure: {e}"),
                }),
            )
                .into_response()
        }
    }
}

/// POST /analyze - relay code plus judging results to the feedback
/// collaborator and return its hint. Collaborator faults come back as
/// explanatory feedback text, never as an error status.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if payload.code.trim().is_empty() || payload.results.trim().is_empty() {
        return client_error("both 'code' and 'results' must be non-empty");
    }

    let feedback = state
        .feedback
        .get_feedback(&payload.code, &payload.results)
        .await;

    (StatusCode::OK, Json(AnalyzeResponse { feedback })).into_response()
}

/// GET /status - health check.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
