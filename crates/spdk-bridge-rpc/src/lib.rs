//! JSON-RPC client for the SPDK storage engine.
//!
//! The engine exposes its command set over a stream socket as JSON-RPC 2.0.
//! This crate sends one request at a time, checks that each reply echoes the
//! request ID, and surfaces engine-reported errors as [`RpcError`]s.
//!
//! # Example
//!
//! ```no_run
//! use spdk_bridge_rpc::{methods, RpcClient, StreamTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = StreamTransport::connect_unix("/var/tmp/spdk.sock").await?;
//! let client = RpcClient::new(transport);
//! let version: methods::VersionInfo =
//!     client.call_without_params(methods::SPDK_GET_VERSION).await?;
//! println!("{}", version.version);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod methods;
pub mod transport;

pub use client::RpcClient;
pub use error::{Result, RpcError};
pub use transport::{StreamTransport, Transport, DEFAULT_SOCKET_PATH};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::mock::MockTransport;
