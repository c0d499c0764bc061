//! Engine method names and their parameter and result shapes.
//!
//! Result records derive `Deserialize` with `#[serde(default)]` on every
//! optional field; the engine adds fields between releases and omits empty
//! ones.

use serde::{Deserialize, Serialize};

// ============================================================================
// Method names
// ============================================================================

/// Create an NVMe-oF subsystem.
pub const NVMF_CREATE_SUBSYSTEM: &str = "nvmf_create_subsystem";
/// Delete an NVMe-oF subsystem.
pub const NVMF_DELETE_SUBSYSTEM: &str = "nvmf_delete_subsystem";
/// List NVMe-oF subsystems, including their namespaces.
pub const NVMF_GET_SUBSYSTEMS: &str = "nvmf_get_subsystems";
/// Report the engine version.
pub const SPDK_GET_VERSION: &str = "spdk_get_version";
/// Report NVMe-oF poll group statistics.
pub const NVMF_GET_STATS: &str = "nvmf_get_stats";
/// Attach a listener to a subsystem.
pub const NVMF_SUBSYSTEM_ADD_LISTENER: &str = "nvmf_subsystem_add_listener";
/// Detach a listener from a subsystem.
pub const NVMF_SUBSYSTEM_REMOVE_LISTENER: &str = "nvmf_subsystem_remove_listener";
/// List a subsystem's listeners.
pub const NVMF_SUBSYSTEM_GET_LISTENERS: &str = "nvmf_subsystem_get_listeners";
/// Attach a namespace to a subsystem.
pub const NVMF_SUBSYSTEM_ADD_NS: &str = "nvmf_subsystem_add_ns";
/// Detach a namespace from a subsystem.
pub const NVMF_SUBSYSTEM_REMOVE_NS: &str = "nvmf_subsystem_remove_ns";
/// Create a vhost virtio-blk controller.
pub const VHOST_CREATE_BLK_CONTROLLER: &str = "vhost_create_blk_controller";
/// Delete a vhost controller.
pub const VHOST_DELETE_CONTROLLER: &str = "vhost_delete_controller";
/// List vhost controllers.
pub const VHOST_GET_CONTROLLERS: &str = "vhost_get_controllers";
/// Report block device I/O statistics.
pub const BDEV_GET_IOSTAT: &str = "bdev_get_iostat";

// ============================================================================
// NVMe-oF subsystems
// ============================================================================

/// Parameters for [`NVMF_CREATE_SUBSYSTEM`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateSubsystemParams {
    /// Subsystem NQN.
    pub nqn: String,
    /// Serial number.
    pub serial_number: String,
    /// Model number.
    pub model_number: String,
    /// Whether any host may connect.
    pub allow_any_host: bool,
    /// Namespace limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_namespaces: Option<i64>,
}

/// Parameters addressing a subsystem by NQN.
#[derive(Debug, Clone, Serialize)]
pub struct SubsystemParams {
    /// Subsystem NQN.
    pub nqn: String,
}

/// A subsystem as reported by [`NVMF_GET_SUBSYSTEMS`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubsystemRecord {
    /// Subsystem NQN.
    pub nqn: String,
    /// `"NVMe"` or `"Discovery"`.
    #[serde(default)]
    pub subtype: String,
    /// Serial number.
    #[serde(default)]
    pub serial_number: String,
    /// Model number.
    #[serde(default)]
    pub model_number: String,
    /// Namespace limit.
    #[serde(default)]
    pub max_namespaces: i64,
    /// Whether any host may connect.
    #[serde(default)]
    pub allow_any_host: bool,
    /// Attached listeners.
    #[serde(default)]
    pub listen_addresses: Vec<ListenAddress>,
    /// Attached namespaces.
    #[serde(default)]
    pub namespaces: Vec<NamespaceRecord>,
}

impl SubsystemRecord {
    /// Subtype string the engine uses for its built-in discovery subsystem.
    pub const DISCOVERY_SUBTYPE: &'static str = "Discovery";

    /// Returns true for the engine's built-in discovery subsystem.
    #[must_use]
    pub fn is_discovery(&self) -> bool {
        self.subtype == Self::DISCOVERY_SUBTYPE
    }
}

/// Result of [`SPDK_GET_VERSION`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionInfo {
    /// Human-readable version string.
    pub version: String,
    /// Version components.
    #[serde(default)]
    pub fields: VersionFields,
}

/// Components of the engine version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionFields {
    /// Major version.
    #[serde(default)]
    pub major: u32,
    /// Minor version.
    #[serde(default)]
    pub minor: u32,
    /// Patch level.
    #[serde(default)]
    pub patch: u32,
    /// Pre-release suffix.
    #[serde(default)]
    pub suffix: String,
}

/// Result of [`NVMF_GET_STATS`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NvmfStats {
    /// Engine tick rate in Hz.
    #[serde(default)]
    pub tick_rate: u64,
    /// Per poll group counters.
    #[serde(default)]
    pub poll_groups: Vec<PollGroupStats>,
}

/// Counters for one NVMe-oF poll group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollGroupStats {
    /// Poll group name.
    #[serde(default)]
    pub name: String,
    /// Admin queue pairs created.
    #[serde(default)]
    pub admin_qpairs: u64,
    /// I/O queue pairs created.
    #[serde(default)]
    pub io_qpairs: u64,
    /// Admin queue pairs currently connected.
    #[serde(default)]
    pub current_admin_qpairs: u64,
    /// I/O queue pairs currently connected.
    #[serde(default)]
    pub current_io_qpairs: u64,
    /// Block device I/Os in flight.
    #[serde(default)]
    pub pending_bdev_io: u64,
}

// ============================================================================
// Listeners
// ============================================================================

/// A listener address in the engine's representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenAddress {
    /// Transport type: `"TCP"` or `"VFIOUSER"`.
    pub trtype: String,
    /// Address family: `"IPv4"` or `"IPv6"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adrfam: Option<String>,
    /// Transport address.
    pub traddr: String,
    /// Transport service ID (the TCP port).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trsvcid: Option<String>,
}

impl ListenAddress {
    /// Transport type for NVMe/TCP.
    pub const TRTYPE_TCP: &'static str = "TCP";
    /// Transport type for vfio-user emulated PCIe.
    pub const TRTYPE_VFIOUSER: &'static str = "VFIOUSER";
    /// Address family for IPv4.
    pub const ADRFAM_IPV4: &'static str = "IPv4";
    /// Address family for IPv6.
    pub const ADRFAM_IPV6: &'static str = "IPv6";

    /// Compare two addresses the way the engine does.
    ///
    /// Transport and address family are case-insensitive; a missing address
    /// family or service ID matches only another missing one.
    #[must_use]
    pub fn same_endpoint(&self, other: &Self) -> bool {
        self.trtype.eq_ignore_ascii_case(&other.trtype)
            && self.traddr == other.traddr
            && self.trsvcid == other.trsvcid
            && match (&self.adrfam, &other.adrfam) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// Parameters for [`NVMF_SUBSYSTEM_ADD_LISTENER`] and
/// [`NVMF_SUBSYSTEM_REMOVE_LISTENER`].
#[derive(Debug, Clone, Serialize)]
pub struct ListenerParams {
    /// Subsystem NQN.
    pub nqn: String,
    /// Listener to add or remove.
    pub listen_address: ListenAddress,
}

/// A listener as reported by [`NVMF_SUBSYSTEM_GET_LISTENERS`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListenerRecord {
    /// Listener address.
    pub address: ListenAddress,
    /// Asymmetric namespace access state.
    #[serde(default)]
    pub ana_state: Option<String>,
}

// ============================================================================
// Namespaces
// ============================================================================

/// Parameters for [`NVMF_SUBSYSTEM_ADD_NS`].
#[derive(Debug, Clone, Serialize)]
pub struct AddNamespaceParams {
    /// Subsystem NQN.
    pub nqn: String,
    /// Namespace to attach.
    pub namespace: NamespaceParams,
}

/// Namespace description inside [`AddNamespaceParams`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceParams {
    /// Requested namespace ID; the engine picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsid: Option<i32>,
    /// Backing block device.
    pub bdev_name: String,
    /// Namespace UUID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Namespace globally unique identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nguid: Option<String>,
    /// IEEE extended unique identifier, 16 hex digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eui64: Option<String>,
}

/// Parameters for [`NVMF_SUBSYSTEM_REMOVE_NS`].
#[derive(Debug, Clone, Serialize)]
pub struct RemoveNamespaceParams {
    /// Subsystem NQN.
    pub nqn: String,
    /// Namespace ID to detach.
    pub nsid: i32,
}

/// A namespace inside a [`SubsystemRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamespaceRecord {
    /// Namespace ID.
    pub nsid: i32,
    /// Backing block device.
    #[serde(default)]
    pub bdev_name: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Namespace UUID.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Namespace globally unique identifier.
    #[serde(default)]
    pub nguid: Option<String>,
    /// IEEE extended unique identifier.
    #[serde(default)]
    pub eui64: Option<String>,
}

// ============================================================================
// Vhost
// ============================================================================

/// Parameters for [`VHOST_CREATE_BLK_CONTROLLER`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateBlkControllerParams {
    /// Controller name.
    pub ctrlr: String,
    /// Backing block device.
    pub dev_name: String,
}

/// Parameters for [`VHOST_DELETE_CONTROLLER`].
#[derive(Debug, Clone, Serialize)]
pub struct DeleteControllerParams {
    /// Controller name.
    pub ctrlr: String,
}

/// Parameters for [`VHOST_GET_CONTROLLERS`].
#[derive(Debug, Clone, Serialize)]
pub struct GetControllersParams {
    /// Restrict the reply to one controller.
    pub name: String,
}

/// A controller as reported by [`VHOST_GET_CONTROLLERS`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VhostControllerRecord {
    /// Controller name.
    pub ctrlr: String,
    /// CPU mask the controller is polled on.
    #[serde(default)]
    pub cpumask: String,
    /// Coalescing delay in microseconds.
    #[serde(default)]
    pub delay_base_us: u64,
    /// IOPS threshold for coalescing.
    #[serde(default)]
    pub iops_threshold: u64,
    /// Vhost-user socket path.
    #[serde(default)]
    pub socket: String,
    /// Backend-specific details, kept opaque.
    #[serde(default)]
    pub backend_specific: serde_json::Value,
}

// ============================================================================
// Block device statistics
// ============================================================================

/// Parameters for [`BDEV_GET_IOSTAT`].
#[derive(Debug, Clone, Serialize)]
pub struct IostatParams {
    /// Block device name.
    pub name: String,
}

/// Result of [`BDEV_GET_IOSTAT`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Iostat {
    /// Engine tick rate in Hz.
    #[serde(default)]
    pub tick_rate: u64,
    /// Per device counters.
    #[serde(default)]
    pub bdevs: Vec<BdevIostat>,
}

/// Counters for one block device. The engine reports `-1` for counters it
/// does not track.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BdevIostat {
    /// Block device name.
    pub name: String,
    /// Bytes read.
    #[serde(default)]
    pub bytes_read: i64,
    /// Read operations.
    #[serde(default)]
    pub num_read_ops: i64,
    /// Bytes written.
    #[serde(default)]
    pub bytes_written: i64,
    /// Write operations.
    #[serde(default)]
    pub num_write_ops: i64,
    /// Bytes unmapped.
    #[serde(default)]
    pub bytes_unmapped: i64,
    /// Unmap operations.
    #[serde(default)]
    pub num_unmap_ops: i64,
    /// Accumulated read latency in ticks.
    #[serde(default)]
    pub read_latency_ticks: i64,
    /// Accumulated write latency in ticks.
    #[serde(default)]
    pub write_latency_ticks: i64,
}
