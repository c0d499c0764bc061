//! Resource lifecycle and pagination for the SPDK storage frontend bridge.
//!
//! This crate holds the bridge's authoritative view of which resources
//! exist and turns typed requests into engine calls. It coordinates between
//! the in-memory registries and the engine's JSON-RPC interface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Gateway (HTTP)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FrontendService                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │ Subsystem   │ │ Controller  │ │ Namespace / Virtio  │    │
//! │  │   Kind      │ │   Kind      │ │      Kinds          │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! │                  Orchestrator<ResourceKind>                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               ▼              ▼              ▼
//!        ┌──────────┐   ┌──────────┐   ┌──────────┐
//!        │ Registry │   │  Page    │   │   RPC    │
//!        │ (memory) │   │ Cursors  │   │ (engine) │
//!        └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use spdk_bridge_control::{BridgeConfig, FrontendService, StorageFrontend};
//! use spdk_bridge_core::{NvmeSubsystem, NvmeSubsystemSpec};
//! use spdk_bridge_rpc::{RpcClient, StreamTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = StreamTransport::connect_unix("/var/tmp/spdk.sock").await?;
//! let frontend =
//!     FrontendService::with_client(RpcClient::new(transport), BridgeConfig::default())?;
//!
//! let subsystem = frontend
//!     .create_nvme_subsystem(NvmeSubsystem {
//!         spec: NvmeSubsystemSpec {
//!             id: "subsystem-test".into(),
//!             nqn: "nqn.2022-09.io.spdk:opi1".to_string(),
//!             ..Default::default()
//!         },
//!         status: None,
//!     })
//!     .await?;
//!
//! println!("Created subsystem: {}", subsystem.spec.id);
//! # Ok(())
//! # }
//! ```
//!
//! # Lifecycle
//!
//! Every resource moves `Absent → Present → Absent`. Create is idempotent on
//! the identifier, children require a registered parent, and list results
//! are paginated with opaque tokens. See the [`orchestrator`] module.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod context;
pub mod controller;
pub mod error;
pub mod namespace;
pub mod orchestrator;
pub mod pagination;
pub mod registry;
pub mod service;
mod stats;
pub mod subsystem;
pub mod types;
pub mod virtio_blk;

pub use context::BridgeContext;
pub use error::{ControlError, ErrorCode, Result};
pub use orchestrator::{Orchestrator, ResourceKind};
pub use pagination::{Page, PageCursors};
pub use registry::Registry;
pub use service::{FrontendService, StorageFrontend};
pub use types::{BridgeConfig, DeleteRequest, ListRequest, ListResponse};

// Re-export commonly used types from dependencies for convenience
pub use spdk_bridge_core::{
    NvmeController, NvmeNamespace, NvmeSubsystem, ResourceId, VirtioBlk, VolumeStats,
};
