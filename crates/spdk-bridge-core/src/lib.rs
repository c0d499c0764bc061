//! Core types for the SPDK storage frontend bridge.
//!
//! This crate provides the foundational types shared by the engine client,
//! the control plane and the HTTP gateway:
//!
//! - **Identifiers**: caller-supplied [`ResourceId`]s
//! - **Resources**: NVMe subsystems, controllers, namespaces and virtio-blk
//! - **Listeners**: transport-tagged listener descriptors and their resolver
//!
//! # Example
//!
//! ```
//! use spdk_bridge_core::{Listener, Transport};
//!
//! let listener = Listener::resolve_tcp("10.10.10.10:4420");
//! assert_eq!(listener.transport(), Transport::TcpIpv4);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod listener;
pub mod types;

pub use ids::{IdError, ResourceId};
pub use listener::{Listener, ListenerError, Transport};
pub use types::{
    NvmeController, NvmeControllerSpec, NvmeControllerStatus, NvmeNamespace, NvmeNamespaceSpec,
    NvmeNamespaceStatus, NvmeSubsystem, NvmeSubsystemSpec, NvmeSubsystemStatus, PciEndpoint,
    PciOperState, PciState, VirtioBlk, VolumeStats,
};
