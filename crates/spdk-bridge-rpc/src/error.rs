//! Error types for engine calls.

use thiserror::Error;

/// A result type using `RpcError`.
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors that can occur while calling the storage engine.
///
/// Every variant carries the engine method name, which prefixes the message.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Writing the request or reading the reply failed.
    #[error("{method}: {source}")]
    Transport {
        /// Engine method being called.
        method: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The reply echoed a different request ID than the one just sent.
    #[error("{method}: json response ID mismatch")]
    ProtocolMismatch {
        /// Engine method being called.
        method: String,
        /// ID of the request that was sent.
        sent: u64,
        /// ID found in the reply.
        received: u64,
    },

    /// The engine reported a non-zero error code.
    #[error("{method}: json response error: {message}")]
    EngineRejected {
        /// Engine method being called.
        method: String,
        /// Engine error code.
        code: i64,
        /// Engine error message, verbatim.
        message: String,
    },

    /// The reply could not be decoded into the expected shape.
    #[error("{method}: {reason}")]
    Decode {
        /// Engine method being called.
        method: String,
        /// What went wrong.
        reason: String,
    },

    /// The request parameters could not be serialized.
    #[error("{method}: failed to encode request: {source}")]
    Encode {
        /// Engine method being called.
        method: String,
        /// Serialization failure.
        #[source]
        source: serde_json::Error,
    },
}
