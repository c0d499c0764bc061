//! Error types for the control plane.
//!
//! This module defines all errors that can occur while orchestrating bridge
//! resources, and the typed [`ErrorCode`] each one is reported with.

use serde::Serialize;
use spdk_bridge_rpc::RpcError;
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in control plane operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// No resource is registered under the key.
    #[error("unable to find key {0}")]
    NotFound(String),

    /// The pagination token was never minted by this process.
    #[error("unable to find pagination token {0}")]
    PageTokenNotFound(String),

    /// A list request asked for a negative page size.
    #[error("negative PageSize is not allowed")]
    NegativePageSize,

    /// The request or the engine's view of it is not acceptable.
    #[error("{0}")]
    InvalidArgument(String),

    /// The engine answered a create call with a false, zero or negative signal.
    #[error("{0}")]
    EngineSignaledFalse(String),

    /// The operation is declared but not supported.
    #[error("{0} method is not implemented")]
    Unimplemented(String),

    /// The engine's state does not match the bridge's records.
    #[error("{0}")]
    Unknown(String),

    /// An engine call failed.
    #[error("{0}")]
    Rpc(#[from] RpcError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Typed error codes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Success.
    Ok,
    /// The addressed resource or token does not exist.
    NotFound,
    /// The request is malformed or the engine rejected its contents.
    InvalidArgument,
    /// The operation is not supported.
    Unimplemented,
    /// A bridge fault.
    Internal,
    /// An engine-originated failure.
    Unknown,
}

impl ErrorCode {
    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
            Self::Unknown => "unknown",
        }
    }

    /// HTTP status code for this error code.
    #[must_use]
    pub const fn http_status_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::InvalidArgument => 400,
            Self::Unimplemented => 501,
            Self::Internal => 500,
            Self::Unknown => 502,
        }
    }
}

impl ControlError {
    /// Returns the typed code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) | Self::PageTokenNotFound(_) => ErrorCode::NotFound,
            Self::NegativePageSize | Self::InvalidArgument(_) | Self::EngineSignaledFalse(_) => {
                ErrorCode::InvalidArgument
            }
            Self::Unimplemented(_) => ErrorCode::Unimplemented,
            Self::Unknown(_) | Self::Rpc(_) => ErrorCode::Unknown,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.code().http_status_code()
    }
}
