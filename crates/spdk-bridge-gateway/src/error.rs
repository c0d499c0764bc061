//! API error types and responses.
//!
//! Every failure leaves the gateway as
//! `{"error": {"code": "<code>", "message": "<message>"}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use spdk_bridge_control::{ControlError, ErrorCode};
use spdk_bridge_core::IdError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource, parent or page token was not found.
    #[error("{0}")]
    NotFound(String),

    /// Invalid request parameters, or the engine refused the request.
    #[error("{0}")]
    InvalidArgument(String),

    /// The operation is not supported.
    #[error("{0}")]
    Unimplemented(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),

    /// The engine failed or could not be reached.
    #[error("{0}")]
    Unknown(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unknown(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound.as_str(),
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument.as_str(),
            Self::Unimplemented(_) => ErrorCode::Unimplemented.as_str(),
            Self::Internal(_) => ErrorCode::Internal.as_str(),
            Self::Unknown(_) => ErrorCode::Unknown.as_str(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        let message = err.to_string();
        match err.code() {
            ErrorCode::NotFound => Self::NotFound(message),
            ErrorCode::InvalidArgument => Self::InvalidArgument(message),
            ErrorCode::Unimplemented => Self::Unimplemented(message),
            ErrorCode::Unknown => {
                tracing::warn!(error = %message, "Engine error");
                Self::Unknown(message)
            }
            ErrorCode::Internal | ErrorCode::Ok => {
                tracing::error!(error = %message, "Internal error");
                Self::Internal(message)
            }
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        Self::InvalidArgument(format!("invalid resource id: {err}"))
    }
}
