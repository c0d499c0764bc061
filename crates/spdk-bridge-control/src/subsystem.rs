//! NVMe subsystems.
//!
//! The natural key is the NQN. The engine's built-in discovery subsystem is
//! never listed. Deleting a subsystem on the engine takes its listeners and
//! namespaces with it, so their registry entries go too.

use async_trait::async_trait;
use spdk_bridge_core::{NvmeSubsystem, NvmeSubsystemSpec, NvmeSubsystemStatus, ResourceId, VolumeStats};
use spdk_bridge_rpc::methods::{self, CreateSubsystemParams, SubsystemParams, SubsystemRecord, VersionInfo};

use crate::context::BridgeContext;
use crate::error::{ControlError, Result};
use crate::orchestrator::ResourceKind;
use crate::registry::Registry;
use crate::stats;

/// Subsystem capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsystemKind;

#[async_trait]
impl ResourceKind for SubsystemKind {
    type Resource = NvmeSubsystem;
    type Parent = ();
    type Scope = ();
    type Record = SubsystemRecord;

    const NAME: &'static str = "NvmeSubsystem";

    fn registry<'a>(&self, ctx: &'a BridgeContext) -> &'a Registry<NvmeSubsystem> {
        &ctx.subsystems
    }

    fn id<'r>(&self, resource: &'r NvmeSubsystem) -> &'r ResourceId {
        &resource.spec.id
    }

    fn parent(&self, _ctx: &BridgeContext, _resource: &NvmeSubsystem) -> Result<()> {
        Ok(())
    }

    async fn create(
        &self,
        ctx: &BridgeContext,
        _parent: (),
        mut resource: NvmeSubsystem,
    ) -> Result<NvmeSubsystem> {
        let spec = &resource.spec;
        let params = CreateSubsystemParams {
            nqn: spec.nqn.clone(),
            serial_number: spec.serial_number.clone(),
            model_number: spec.model_number.clone(),
            allow_any_host: true,
            max_namespaces: (spec.max_namespaces > 0).then_some(spec.max_namespaces),
        };
        let created: bool = ctx.rpc.call(methods::NVMF_CREATE_SUBSYSTEM, &params).await?;
        if !created {
            let msg = format!("Could not create NQN: {}", spec.nqn);
            tracing::warn!(id = %spec.id, "{msg}");
            return Err(ControlError::EngineSignaledFalse(msg));
        }

        let version: VersionInfo = ctx.rpc.call_without_params(methods::SPDK_GET_VERSION).await?;
        tracing::info!(
            subsystem_id = %spec.id,
            nqn = %spec.nqn,
            firmware = %version.version,
            "Created NVMe subsystem"
        );
        resource.status = Some(NvmeSubsystemStatus {
            firmware_revision: version.version,
        });
        Ok(resource)
    }

    async fn delete(&self, ctx: &BridgeContext, stored: &NvmeSubsystem) -> Result<bool> {
        let params = SubsystemParams {
            nqn: stored.spec.nqn.clone(),
        };
        let deleted: bool = ctx.rpc.call(methods::NVMF_DELETE_SUBSYSTEM, &params).await?;

        let id = &stored.spec.id;
        let controllers = ctx.controllers.retain(|c| &c.spec.subsystem_id != id);
        let namespaces = ctx.namespaces.retain(|n| &n.spec.subsystem_id != id);
        if controllers + namespaces > 0 {
            tracing::info!(
                subsystem_id = %id,
                controllers,
                namespaces,
                "Dropped children of deleted subsystem"
            );
        }
        Ok(deleted)
    }

    fn scope(&self, _ctx: &BridgeContext, _parent: Option<&ResourceId>) -> Result<()> {
        Ok(())
    }

    fn scope_of(&self, _ctx: &BridgeContext, _stored: &NvmeSubsystem) -> Result<()> {
        Ok(())
    }

    async fn fetch(&self, ctx: &BridgeContext, _scope: &()) -> Result<Vec<SubsystemRecord>> {
        let records: Vec<SubsystemRecord> =
            ctx.rpc.call_without_params(methods::NVMF_GET_SUBSYSTEMS).await?;
        Ok(records.into_iter().filter(|r| !r.is_discovery()).collect())
    }

    fn matches(&self, _scope: &(), stored: &NvmeSubsystem, record: &SubsystemRecord) -> bool {
        stored.spec.nqn == record.nqn
    }

    fn shape(&self, _scope: &(), record: SubsystemRecord) -> NvmeSubsystem {
        NvmeSubsystem {
            spec: NvmeSubsystemSpec {
                id: ResourceId::default(),
                nqn: record.nqn,
                serial_number: record.serial_number,
                model_number: record.model_number,
                max_namespaces: record.max_namespaces,
            },
            status: None,
        }
    }

    fn lookup_failure(&self, stored: &NvmeSubsystem, _found: usize) -> String {
        format!("Could not find NQN: {}", stored.spec.nqn)
    }

    fn refresh(&self, stored: NvmeSubsystem, _record: SubsystemRecord) -> NvmeSubsystem {
        stored
    }

    async fn stats(&self, ctx: &BridgeContext, stored: &NvmeSubsystem) -> Result<VolumeStats> {
        stats::nvmf_stats(ctx, &stored.spec.id).await
    }
}
