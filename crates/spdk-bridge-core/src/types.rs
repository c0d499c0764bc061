//! Typed resource schema exposed by the bridge.
//!
//! Each resource is split into a caller-owned `spec` and an engine-confirmed
//! `status`, mirroring how the objects flow through create and get.

use serde::{Deserialize, Serialize};

use crate::ids::ResourceId;
use crate::listener::Listener;

/// A PCIe physical/virtual function coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PciEndpoint {
    /// Physical function number.
    pub physical_function: i32,
    /// Virtual function number.
    pub virtual_function: i32,
}

// ============================================================================
// NVMe subsystem
// ============================================================================

/// An NVMe subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeSubsystem {
    /// Desired configuration.
    pub spec: NvmeSubsystemSpec,
    /// Engine-reported status, absent until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NvmeSubsystemStatus>,
}

/// Caller-supplied subsystem configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeSubsystemSpec {
    /// Bridge identifier.
    pub id: ResourceId,
    /// NVMe qualified name, unique on the engine.
    pub nqn: String,
    /// Serial number reported to hosts.
    #[serde(default)]
    pub serial_number: String,
    /// Model number reported to hosts.
    #[serde(default)]
    pub model_number: String,
    /// Namespace limit; zero lets the engine pick.
    #[serde(default)]
    pub max_namespaces: i64,
}

/// Engine-confirmed subsystem status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeSubsystemStatus {
    /// Engine firmware revision string.
    pub firmware_revision: String,
}

// ============================================================================
// NVMe controller
// ============================================================================

/// An NVMe controller attached to a subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeController {
    /// Desired configuration.
    pub spec: NvmeControllerSpec,
    /// Engine-reported status, absent until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NvmeControllerStatus>,
}

/// Caller-supplied controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeControllerSpec {
    /// Bridge identifier.
    pub id: ResourceId,
    /// Parent subsystem identifier.
    pub subsystem_id: ResourceId,
    /// PCIe function used when no TCP listener is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcie_id: Option<PciEndpoint>,
    /// Controller ID; `-1` means dynamically assigned.
    #[serde(default)]
    pub nvme_controller_id: i32,
}

/// Engine-confirmed controller status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeControllerStatus {
    /// Whether the listener is active.
    pub active: bool,
    /// NQN of the subsystem the listener was added to.
    #[serde(default)]
    pub subsystem_nqn: String,
    /// The listener the controller is reachable through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<Listener>,
}

// ============================================================================
// NVMe namespace
// ============================================================================

/// An NVMe namespace backed by an engine volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeNamespace {
    /// Desired configuration.
    pub spec: NvmeNamespaceSpec,
    /// Engine-reported status, absent until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NvmeNamespaceStatus>,
}

/// Caller-supplied namespace configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeNamespaceSpec {
    /// Bridge identifier.
    pub id: ResourceId,
    /// Parent subsystem identifier.
    pub subsystem_id: ResourceId,
    /// Namespace ID as seen by the host; zero lets the engine pick.
    #[serde(default)]
    pub host_nsid: i32,
    /// Engine block device backing the namespace.
    pub volume_id: ResourceId,
    /// Namespace UUID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Namespace globally unique identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nguid: Option<String>,
    /// IEEE extended unique identifier; zero when unset.
    #[serde(default)]
    pub eui64: i64,
}

/// Engine-confirmed namespace status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NvmeNamespaceStatus {
    /// NQN of the subsystem the namespace was added to.
    #[serde(default)]
    pub subsystem_nqn: String,
    /// Administrative PCI state.
    pub pci_state: PciState,
    /// Operational PCI state.
    pub pci_oper_state: PciOperState,
}

impl NvmeNamespaceStatus {
    /// Status of a namespace the engine has attached to `subsystem_nqn`.
    #[must_use]
    pub fn attached(subsystem_nqn: impl Into<String>) -> Self {
        Self {
            subsystem_nqn: subsystem_nqn.into(),
            pci_state: PciState::Enabled,
            pci_oper_state: PciOperState::Online,
        }
    }
}

/// Administrative PCI state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PciState {
    /// Unknown.
    #[default]
    Unspecified = 0,
    /// Disabled by the operator.
    Disabled = 1,
    /// Enabled.
    Enabled = 2,
}

/// Operational PCI state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PciOperState {
    /// Unknown.
    #[default]
    Unspecified = 0,
    /// Serving I/O.
    Online = 1,
    /// Not serving I/O.
    Offline = 2,
}

// ============================================================================
// Virtio-blk
// ============================================================================

/// A virtio-blk controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioBlk {
    /// Bridge identifier, also the engine controller name.
    pub id: ResourceId,
    /// PCIe function exposing the device.
    #[serde(default)]
    pub pcie_id: PciEndpoint,
    /// Engine block device backing the controller.
    pub volume_id: ResourceId,
    /// Maximum number of I/O queue pairs.
    #[serde(default)]
    pub max_io_qps: i64,
}

// ============================================================================
// Statistics
// ============================================================================

/// Volume I/O counters. `-1` means the engine did not report the counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStats {
    /// Bytes read.
    pub read_bytes_count: i64,
    /// Read operations.
    pub read_ops_count: i64,
    /// Bytes written.
    pub write_bytes_count: i64,
    /// Write operations.
    pub write_ops_count: i64,
    /// Bytes unmapped.
    pub unmap_bytes_count: i64,
    /// Unmap operations.
    pub unmap_ops_count: i64,
    /// Accumulated read latency in engine ticks.
    pub read_latency_ticks: i64,
    /// Accumulated write latency in engine ticks.
    pub write_latency_ticks: i64,
}

impl VolumeStats {
    /// Counters for an object the engine keeps no per-object totals for.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            read_bytes_count: -1,
            read_ops_count: -1,
            write_bytes_count: -1,
            write_ops_count: -1,
            unmap_bytes_count: -1,
            unmap_ops_count: -1,
            read_latency_ticks: -1,
            write_latency_ticks: -1,
        }
    }
}
