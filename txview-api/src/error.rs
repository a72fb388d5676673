//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use txview_core::error::{TxviewError, UpstreamError};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Malformed identifier or query.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "VALIDATION_ERROR")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Maps an upstream failure onto the status the client sees.
    pub fn upstream(err: &UpstreamError) -> Self {
        let message = err.to_string();
        match err {
            UpstreamError::Timeout { .. } => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, message, "UPSTREAM_TIMEOUT")
            }
            UpstreamError::ConnectionFailed(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "UPSTREAM_UNAVAILABLE")
            }
            UpstreamError::HttpStatus(code) => {
                let status = StatusCode::from_u16(*code)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, message, "UPSTREAM_HTTP_ERROR")
            }
            UpstreamError::MalformedBody(_) => {
                Self::new(StatusCode::BAD_GATEWAY, message, "UPSTREAM_BAD_PAYLOAD")
            }
        }
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<TxviewError> for ApiError {
    fn from(err: TxviewError) -> Self {
        match &err {
            TxviewError::Validation(_) => ApiError::validation(err.to_string()),
            TxviewError::Upstream(upstream) => ApiError::upstream(upstream),
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}
