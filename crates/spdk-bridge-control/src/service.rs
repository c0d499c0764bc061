//! Frontend service implementation.
//!
//! This module provides the `StorageFrontend` trait and the
//! `FrontendService` implementation that runs every operation through the
//! generic orchestrator.

use std::sync::Arc;

use async_trait::async_trait;
use spdk_bridge_core::{
    NvmeController, NvmeNamespace, NvmeSubsystem, ResourceId, VirtioBlk, VolumeStats,
};
use spdk_bridge_rpc::RpcClient;

use crate::context::BridgeContext;
use crate::controller::ControllerKind;
use crate::error::Result;
use crate::namespace::NamespaceKind;
use crate::orchestrator::{Orchestrator, ResourceKind};
use crate::subsystem::SubsystemKind;
use crate::types::{BridgeConfig, DeleteRequest, ListRequest, ListResponse};
use crate::virtio_blk::VirtioBlkKind;

/// Trait defining the typed storage frontend API.
///
/// Each resource kind gets the same six operations. Update is declared for
/// every kind and always fails with `ControlError::Unimplemented`.
#[async_trait]
pub trait StorageFrontend: Send + Sync {
    // =========================================================================
    // NVMe subsystems
    // =========================================================================

    /// Create a subsystem, or return the registered one with the same id.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::EngineSignaledFalse` if the engine refuses the NQN.
    async fn create_nvme_subsystem(&self, subsystem: NvmeSubsystem) -> Result<NvmeSubsystem>;

    /// Delete a subsystem.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` unless the subsystem exists or
    /// `allow_missing` is set.
    async fn delete_nvme_subsystem(&self, request: DeleteRequest) -> Result<()>;

    /// Update a subsystem.
    async fn update_nvme_subsystem(&self, subsystem: NvmeSubsystem) -> Result<NvmeSubsystem>;

    /// List subsystems known to the engine.
    async fn list_nvme_subsystems(
        &self,
        request: ListRequest,
    ) -> Result<ListResponse<NvmeSubsystem>>;

    /// Get a subsystem.
    async fn get_nvme_subsystem(&self, id: &ResourceId) -> Result<NvmeSubsystem>;

    /// Get a subsystem's statistics.
    async fn nvme_subsystem_stats(&self, id: &ResourceId) -> Result<VolumeStats>;

    // =========================================================================
    // NVMe controllers
    // =========================================================================

    /// Create a controller under a registered subsystem.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the subsystem is not registered.
    async fn create_nvme_controller(&self, controller: NvmeController) -> Result<NvmeController>;

    /// Delete a controller.
    async fn delete_nvme_controller(&self, request: DeleteRequest) -> Result<()>;

    /// Update a controller.
    async fn update_nvme_controller(&self, controller: NvmeController) -> Result<NvmeController>;

    /// List a subsystem's controllers.
    async fn list_nvme_controllers(
        &self,
        request: ListRequest,
    ) -> Result<ListResponse<NvmeController>>;

    /// Get a controller.
    async fn get_nvme_controller(&self, id: &ResourceId) -> Result<NvmeController>;

    /// Get a controller's statistics.
    async fn nvme_controller_stats(&self, id: &ResourceId) -> Result<VolumeStats>;

    // =========================================================================
    // NVMe namespaces
    // =========================================================================

    /// Create a namespace under a registered subsystem.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::NotFound` if the subsystem is not registered.
    async fn create_nvme_namespace(&self, namespace: NvmeNamespace) -> Result<NvmeNamespace>;

    /// Delete a namespace.
    async fn delete_nvme_namespace(&self, request: DeleteRequest) -> Result<()>;

    /// Update a namespace.
    async fn update_nvme_namespace(&self, namespace: NvmeNamespace) -> Result<NvmeNamespace>;

    /// List a subsystem's namespaces.
    async fn list_nvme_namespaces(
        &self,
        request: ListRequest,
    ) -> Result<ListResponse<NvmeNamespace>>;

    /// Get a namespace.
    async fn get_nvme_namespace(&self, id: &ResourceId) -> Result<NvmeNamespace>;

    /// Get a namespace's volume statistics.
    async fn nvme_namespace_stats(&self, id: &ResourceId) -> Result<VolumeStats>;

    // =========================================================================
    // Virtio-blk
    // =========================================================================

    /// Create a virtio-blk controller.
    async fn create_virtio_blk(&self, virtio_blk: VirtioBlk) -> Result<VirtioBlk>;

    /// Delete a virtio-blk controller.
    async fn delete_virtio_blk(&self, request: DeleteRequest) -> Result<()>;

    /// Update a virtio-blk controller.
    async fn update_virtio_blk(&self, virtio_blk: VirtioBlk) -> Result<VirtioBlk>;

    /// List virtio-blk controllers.
    async fn list_virtio_blks(&self, request: ListRequest) -> Result<ListResponse<VirtioBlk>>;

    /// Get a virtio-blk controller.
    async fn get_virtio_blk(&self, id: &ResourceId) -> Result<VirtioBlk>;

    /// Get a virtio-blk controller's volume statistics.
    async fn virtio_blk_stats(&self, id: &ResourceId) -> Result<VolumeStats>;
}

/// The frontend service implementation.
#[derive(Debug, Clone)]
pub struct FrontendService {
    ctx: Arc<BridgeContext>,
}

impl FrontendService {
    /// Create a service over an existing context.
    #[must_use]
    pub const fn new(ctx: Arc<BridgeContext>) -> Self {
        Self { ctx }
    }

    /// Create a service with empty registries.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` if `config` does not validate.
    pub fn with_client(rpc: RpcClient, config: BridgeConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(BridgeContext::new(rpc, config)?)))
    }

    /// Get the shared context.
    #[must_use]
    pub fn context(&self) -> &BridgeContext {
        &self.ctx
    }

    fn orchestrator<K: ResourceKind>(&self, kind: K) -> Orchestrator<'_, K> {
        Orchestrator::new(&self.ctx, kind)
    }
}

#[async_trait]
impl StorageFrontend for FrontendService {
    // =========================================================================
    // NVMe subsystems
    // =========================================================================

    async fn create_nvme_subsystem(&self, subsystem: NvmeSubsystem) -> Result<NvmeSubsystem> {
        self.orchestrator(SubsystemKind).create(subsystem).await
    }

    async fn delete_nvme_subsystem(&self, request: DeleteRequest) -> Result<()> {
        self.orchestrator(SubsystemKind).delete(&request).await
    }

    async fn update_nvme_subsystem(&self, subsystem: NvmeSubsystem) -> Result<NvmeSubsystem> {
        self.orchestrator(SubsystemKind).update(&subsystem)
    }

    async fn list_nvme_subsystems(
        &self,
        request: ListRequest,
    ) -> Result<ListResponse<NvmeSubsystem>> {
        self.orchestrator(SubsystemKind).list(&request).await
    }

    async fn get_nvme_subsystem(&self, id: &ResourceId) -> Result<NvmeSubsystem> {
        self.orchestrator(SubsystemKind).get(id).await
    }

    async fn nvme_subsystem_stats(&self, id: &ResourceId) -> Result<VolumeStats> {
        self.orchestrator(SubsystemKind).stats(id).await
    }

    // =========================================================================
    // NVMe controllers
    // =========================================================================

    async fn create_nvme_controller(&self, controller: NvmeController) -> Result<NvmeController> {
        self.orchestrator(ControllerKind).create(controller).await
    }

    async fn delete_nvme_controller(&self, request: DeleteRequest) -> Result<()> {
        self.orchestrator(ControllerKind).delete(&request).await
    }

    async fn update_nvme_controller(&self, controller: NvmeController) -> Result<NvmeController> {
        self.orchestrator(ControllerKind).update(&controller)
    }

    async fn list_nvme_controllers(
        &self,
        request: ListRequest,
    ) -> Result<ListResponse<NvmeController>> {
        self.orchestrator(ControllerKind).list(&request).await
    }

    async fn get_nvme_controller(&self, id: &ResourceId) -> Result<NvmeController> {
        self.orchestrator(ControllerKind).get(id).await
    }

    async fn nvme_controller_stats(&self, id: &ResourceId) -> Result<VolumeStats> {
        self.orchestrator(ControllerKind).stats(id).await
    }

    // =========================================================================
    // NVMe namespaces
    // =========================================================================

    async fn create_nvme_namespace(&self, namespace: NvmeNamespace) -> Result<NvmeNamespace> {
        self.orchestrator(NamespaceKind).create(namespace).await
    }

    async fn delete_nvme_namespace(&self, request: DeleteRequest) -> Result<()> {
        self.orchestrator(NamespaceKind).delete(&request).await
    }

    async fn update_nvme_namespace(&self, namespace: NvmeNamespace) -> Result<NvmeNamespace> {
        self.orchestrator(NamespaceKind).update(&namespace)
    }

    async fn list_nvme_namespaces(
        &self,
        request: ListRequest,
    ) -> Result<ListResponse<NvmeNamespace>> {
        self.orchestrator(NamespaceKind).list(&request).await
    }

    async fn get_nvme_namespace(&self, id: &ResourceId) -> Result<NvmeNamespace> {
        self.orchestrator(NamespaceKind).get(id).await
    }

    async fn nvme_namespace_stats(&self, id: &ResourceId) -> Result<VolumeStats> {
        self.orchestrator(NamespaceKind).stats(id).await
    }

    // =========================================================================
    // Virtio-blk
    // =========================================================================

    async fn create_virtio_blk(&self, virtio_blk: VirtioBlk) -> Result<VirtioBlk> {
        self.orchestrator(VirtioBlkKind).create(virtio_blk).await
    }

    async fn delete_virtio_blk(&self, request: DeleteRequest) -> Result<()> {
        self.orchestrator(VirtioBlkKind).delete(&request).await
    }

    async fn update_virtio_blk(&self, virtio_blk: VirtioBlk) -> Result<VirtioBlk> {
        self.orchestrator(VirtioBlkKind).update(&virtio_blk)
    }

    async fn list_virtio_blks(&self, request: ListRequest) -> Result<ListResponse<VirtioBlk>> {
        self.orchestrator(VirtioBlkKind).list(&request).await
    }

    async fn get_virtio_blk(&self, id: &ResourceId) -> Result<VirtioBlk> {
        self.orchestrator(VirtioBlkKind).get(id).await
    }

    async fn virtio_blk_stats(&self, id: &ResourceId) -> Result<VolumeStats> {
        self.orchestrator(VirtioBlkKind).stats(id).await
    }
}
