//! API error types with HTTP response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mediator::MediatorError;
use order_store::StorageError;
use serde::Serialize;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// The request body or query string could not be decoded.
    #[error("Invalid request: {0}")]
    Malformed(String),

    /// Terminal failure of an order pipeline.
    #[error(transparent)]
    Pipeline(#[from] MediatorError),

    /// Read-side store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error body: `{"error": message, "kind": kind}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(err) => match err {
                MediatorError::Validation(_) => StatusCode::BAD_REQUEST,
                MediatorError::Storage(_) => StatusCode::BAD_GATEWAY,
                MediatorError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                MediatorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Storage(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Malformed(_) => "validation",
            ApiError::Pipeline(err) => err.kind(),
            ApiError::Storage(_) => "storage",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        }

        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
