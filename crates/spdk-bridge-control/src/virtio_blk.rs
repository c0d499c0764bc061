//! Virtio-blk controllers.
//!
//! The bridge identifier doubles as the engine's controller name.

use async_trait::async_trait;
use spdk_bridge_core::{ResourceId, VirtioBlk, VolumeStats};
use spdk_bridge_rpc::methods::{
    self, CreateBlkControllerParams, DeleteControllerParams, GetControllersParams,
    VhostControllerRecord,
};

use crate::context::BridgeContext;
use crate::error::{ControlError, Result};
use crate::orchestrator::ResourceKind;
use crate::registry::Registry;
use crate::stats;

/// Virtio-blk capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtioBlkKind;

#[async_trait]
impl ResourceKind for VirtioBlkKind {
    type Resource = VirtioBlk;
    type Parent = ();
    type Scope = ();
    type Record = VhostControllerRecord;

    const NAME: &'static str = "VirtioBlk";

    fn registry<'a>(&self, ctx: &'a BridgeContext) -> &'a Registry<VirtioBlk> {
        &ctx.virtio_blks
    }

    fn id<'r>(&self, resource: &'r VirtioBlk) -> &'r ResourceId {
        &resource.id
    }

    fn parent(&self, _ctx: &BridgeContext, _resource: &VirtioBlk) -> Result<()> {
        Ok(())
    }

    async fn create(
        &self,
        ctx: &BridgeContext,
        _parent: (),
        resource: VirtioBlk,
    ) -> Result<VirtioBlk> {
        let params = CreateBlkControllerParams {
            ctrlr: resource.id.to_string(),
            dev_name: resource.volume_id.to_string(),
        };
        let created: bool = ctx
            .rpc
            .call(methods::VHOST_CREATE_BLK_CONTROLLER, &params)
            .await?;
        if !created {
            let msg = format!("Could not create virtio-blk: {}", resource.id);
            tracing::warn!(volume_id = %resource.volume_id, "{msg}");
            return Err(ControlError::EngineSignaledFalse(msg));
        }

        tracing::info!(
            virtio_blk_id = %resource.id,
            volume_id = %resource.volume_id,
            "Created virtio-blk controller"
        );
        Ok(resource)
    }

    async fn delete(&self, ctx: &BridgeContext, stored: &VirtioBlk) -> Result<bool> {
        let params = DeleteControllerParams {
            ctrlr: stored.id.to_string(),
        };
        Ok(ctx.rpc.call(methods::VHOST_DELETE_CONTROLLER, &params).await?)
    }

    fn scope(&self, _ctx: &BridgeContext, _parent: Option<&ResourceId>) -> Result<()> {
        Ok(())
    }

    fn scope_of(&self, _ctx: &BridgeContext, _stored: &VirtioBlk) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, ctx: &BridgeContext, _scope: &()) -> Result<Vec<VhostControllerRecord>> {
        Ok(ctx
            .rpc
            .call_without_params(methods::VHOST_GET_CONTROLLERS)
            .await?)
    }

    fn matches(&self, _scope: &(), stored: &VirtioBlk, record: &VhostControllerRecord) -> bool {
        stored.id == record.ctrlr.as_str()
    }

    fn shape(&self, _scope: &(), record: VhostControllerRecord) -> VirtioBlk {
        VirtioBlk {
            id: ResourceId::new(record.ctrlr),
            ..VirtioBlk::default()
        }
    }

    async fn lookup(
        &self,
        ctx: &BridgeContext,
        stored: &VirtioBlk,
    ) -> Result<Vec<VhostControllerRecord>> {
        let params = GetControllersParams {
            name: stored.id.to_string(),
        };
        Ok(ctx.rpc.call(methods::VHOST_GET_CONTROLLERS, &params).await?)
    }

    fn lookup_failure(&self, _stored: &VirtioBlk, found: usize) -> String {
        format!("expecting exactly 1 result, got {found}")
    }

    fn refresh(&self, stored: VirtioBlk, _record: VhostControllerRecord) -> VirtioBlk {
        stored
    }

    async fn stats(&self, ctx: &BridgeContext, stored: &VirtioBlk) -> Result<VolumeStats> {
        stats::volume_stats(ctx, &stored.volume_id).await
    }
}
