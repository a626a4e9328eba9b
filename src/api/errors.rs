use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::errors::QuizError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    Quiz(QuizError),
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        Self::Quiz(err)
    }
}

/// Every quiz failure is reported to the caller as a 400. The kinds stay
/// distinct so this mapping can change without touching the services.
pub(crate) fn quiz_status(err: &QuizError) -> StatusCode {
    match err {
        QuizError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        QuizError::NotFound(_) => StatusCode::BAD_REQUEST,
        QuizError::StorageFailure(_) => StatusCode::BAD_REQUEST,
    }
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            ApiError::Quiz(err) => {
                if let QuizError::StorageFailure(_) = err {
                    tracing::error!(error = %err, "Answer key storage failure");
                } else {
                    tracing::warn!(kind = err.kind(), error = %err, "Quiz request rejected");
                }
                error_response(quiz_status(&err), err.to_string())
            }
        }
    }
}
