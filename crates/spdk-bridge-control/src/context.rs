//! Server context shared by every operation.

use spdk_bridge_core::{NvmeController, NvmeNamespace, NvmeSubsystem, VirtioBlk};
use spdk_bridge_rpc::RpcClient;

use crate::error::Result;
use crate::pagination::PageCursors;
use crate::registry::{CreateGuards, Registry};
use crate::types::BridgeConfig;

/// Engine client, per-kind registries and the cursor map.
#[derive(Debug)]
pub struct BridgeContext {
    /// Engine client.
    pub rpc: RpcClient,
    /// Registered NVMe subsystems.
    pub subsystems: Registry<NvmeSubsystem>,
    /// Registered NVMe controllers.
    pub controllers: Registry<NvmeController>,
    /// Registered NVMe namespaces.
    pub namespaces: Registry<NvmeNamespace>,
    /// Registered virtio-blk controllers.
    pub virtio_blks: Registry<VirtioBlk>,
    /// Pagination cursors shared by all list operations.
    pub cursors: PageCursors,
    /// Creates in flight, one per identifier.
    pub creates: CreateGuards,
    /// Bridge configuration.
    pub config: BridgeConfig,
}

impl BridgeContext {
    /// Create a context with empty registries.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` if `config` does not validate.
    pub fn new(rpc: RpcClient, config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rpc,
            subsystems: Registry::new(),
            controllers: Registry::new(),
            namespaces: Registry::new(),
            virtio_blks: Registry::new(),
            cursors: PageCursors::new(),
            creates: CreateGuards::new(),
            config,
        })
    }
}
