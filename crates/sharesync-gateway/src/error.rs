use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sharesync_core::SyncError;
use tracing::error;

use crate::types::ErrorResponse;

/// Error envelope returned by every JSON route: `{ "error": ..., "details": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, None)
    }

    pub fn not_found(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error, Some(details.into()))
    }

    /// Map a core error raised while doing `context` onto a status.
    ///
    /// Validation problems surface their own message; everything else is
    /// reported under `context` with the cause in `details`.
    pub fn from_sync(context: &str, err: SyncError) -> Self {
        error!(context, error = %err, "Request failed");
        match err {
            SyncError::Validation(message) => Self::bad_request(message),
            conflict @ SyncError::Authorization(_) => {
                Self::new(StatusCode::CONFLICT, context, Some(conflict.to_string()))
            }
            SyncError::IndexingFailed(cause) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                context,
                Some(cause.to_string()),
            ),
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                context,
                Some(other.to_string()),
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
