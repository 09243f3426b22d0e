use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use vaxtrack_core::DomainError;
use vaxtrack_infra::StoreError;
use vaxtrack_infra::workflows::WorkflowError;

pub fn workflow_error_to_response(err: WorkflowError) -> axum::response::Response {
    match err {
        WorkflowError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "message": fields.to_string(),
                "fields": fields,
            })),
        )
            .into_response(),
        WorkflowError::Store(e) => store_error_to_response(e),
        WorkflowError::PartialFailure {
            committed_table,
            committed_id,
            step,
            source,
        } => {
            tracing::error!(committed_table, %committed_id, step, error = %source, "workflow left partial write");
            (
                StatusCode::BAD_GATEWAY,
                axum::Json(json!({
                    "error": "partial_failure",
                    "message": "The operation failed. Please try again.",
                    "committed_table": committed_table,
                    "committed_id": committed_id,
                })),
            )
                .into_response()
        }
    }
}

/// Store failures are shown generically; the cause is only logged.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        other => {
            tracing::error!(error = %other, "record store call failed");
            json_error(
                StatusCode::BAD_GATEWAY,
                "store_error",
                "The record store is unavailable. Please try again.",
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        other => json_error(StatusCode::BAD_REQUEST, "invalid_query", other.to_string()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
