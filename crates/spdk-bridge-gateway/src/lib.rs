//! HTTP gateway for the SPDK storage frontend bridge.
//!
//! This crate exposes the typed storage frontend as a REST API. It handles:
//!
//! - Routing for subsystems, controllers, namespaces and virtio-blk
//! - Mapping typed control errors onto HTTP statuses
//! - Request tracing, CORS, body limits and timeouts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Clients                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    spdk-bridge-gateway                      │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Router    │ │  Handlers   │ │  ApiError mapping   │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                    ┌──────────────────┐      ┌──────────┐
//!                    │ StorageFrontend  │ ───▶ │   SPDK   │
//!                    │    (control)     │ rpc  │  engine  │
//!                    └──────────────────┘      └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use spdk_bridge_control::{BridgeConfig, FrontendService};
//! use spdk_bridge_gateway::{create_router, GatewayConfig, GatewayState};
//! use spdk_bridge_rpc::{RpcClient, StreamTransport, DEFAULT_SOCKET_PATH};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = StreamTransport::connect_unix(DEFAULT_SOCKET_PATH).await?;
//! let frontend = Arc::new(FrontendService::with_client(
//!     RpcClient::new(transport),
//!     BridgeConfig::default(),
//! )?);
//!
//! let state = GatewayState::new(frontend, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;
