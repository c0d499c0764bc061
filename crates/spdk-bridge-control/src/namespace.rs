//! NVMe namespaces.
//!
//! The natural key is `(subsystem, host_nsid)`. The engine reports namespaces
//! as part of their subsystem, so listing fetches every subsystem and keeps
//! the parent's.

use async_trait::async_trait;
use spdk_bridge_core::{
    NvmeNamespace, NvmeNamespaceSpec, NvmeNamespaceStatus, NvmeSubsystem, ResourceId, VolumeStats,
};
use spdk_bridge_rpc::methods::{
    self, AddNamespaceParams, NamespaceParams, NamespaceRecord, RemoveNamespaceParams,
    SubsystemRecord,
};

use crate::context::BridgeContext;
use crate::error::{ControlError, Result};
use crate::orchestrator::ResourceKind;
use crate::registry::Registry;
use crate::stats;

/// Namespace capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceKind;

fn missing_subsystem(id: &ResourceId) -> ControlError {
    ControlError::Unknown(format!("unable to find subsystem {id}"))
}

/// Render an EUI-64 as the engine's 16 hex digit string; zero means unset.
fn eui64_to_hex(eui64: i64) -> Option<String> {
    (eui64 != 0).then(|| format!("{eui64:016X}"))
}

/// Parse the engine's EUI-64 string, keeping the bit pattern.
#[allow(clippy::cast_possible_wrap)]
fn eui64_from_hex(hex: Option<&str>) -> i64 {
    hex.and_then(|h| u64::from_str_radix(h, 16).ok())
        .map_or(0, |v| v as i64)
}

#[async_trait]
impl ResourceKind for NamespaceKind {
    type Resource = NvmeNamespace;
    type Parent = NvmeSubsystem;
    type Scope = NvmeSubsystem;
    type Record = NamespaceRecord;

    const NAME: &'static str = "NvmeNamespace";

    fn registry<'a>(&self, ctx: &'a BridgeContext) -> &'a Registry<NvmeNamespace> {
        &ctx.namespaces
    }

    fn id<'r>(&self, resource: &'r NvmeNamespace) -> &'r ResourceId {
        &resource.spec.id
    }

    fn parent(&self, ctx: &BridgeContext, resource: &NvmeNamespace) -> Result<NvmeSubsystem> {
        let subsystem_id = &resource.spec.subsystem_id;
        ctx.subsystems
            .get(subsystem_id)
            .ok_or_else(|| ControlError::NotFound(subsystem_id.to_string()))
    }

    async fn create(
        &self,
        ctx: &BridgeContext,
        subsystem: NvmeSubsystem,
        mut resource: NvmeNamespace,
    ) -> Result<NvmeNamespace> {
        let spec = &resource.spec;
        let params = AddNamespaceParams {
            nqn: subsystem.spec.nqn.clone(),
            namespace: NamespaceParams {
                nsid: (spec.host_nsid > 0).then_some(spec.host_nsid),
                bdev_name: spec.volume_id.to_string(),
                uuid: spec.uuid.clone(),
                nguid: spec.nguid.clone(),
                eui64: eui64_to_hex(spec.eui64),
            },
        };
        let nsid: i32 = ctx.rpc.call(methods::NVMF_SUBSYSTEM_ADD_NS, &params).await?;
        if nsid <= 0 {
            let msg = format!("Could not create NS: {}", spec.id);
            tracing::warn!(nqn = %subsystem.spec.nqn, nsid, "{msg}");
            return Err(ControlError::EngineSignaledFalse(msg));
        }

        tracing::info!(
            namespace_id = %spec.id,
            nqn = %subsystem.spec.nqn,
            nsid,
            volume_id = %spec.volume_id,
            "Created NVMe namespace"
        );
        resource.spec.host_nsid = nsid;
        resource.status = Some(NvmeNamespaceStatus::attached(subsystem.spec.nqn));
        Ok(resource)
    }

    async fn delete(&self, ctx: &BridgeContext, stored: &NvmeNamespace) -> Result<bool> {
        let nqn = stored
            .status
            .as_ref()
            .map(|s| s.subsystem_nqn.clone())
            .filter(|nqn| !nqn.is_empty())
            .ok_or_else(|| {
                ControlError::Internal(format!("namespace {} has no subsystem", stored.spec.id))
            })?;
        let params = RemoveNamespaceParams {
            nqn,
            nsid: stored.spec.host_nsid,
        };
        Ok(ctx.rpc.call(methods::NVMF_SUBSYSTEM_REMOVE_NS, &params).await?)
    }

    fn scope(&self, ctx: &BridgeContext, parent: Option<&ResourceId>) -> Result<NvmeSubsystem> {
        let parent = parent.ok_or_else(|| {
            ControlError::InvalidArgument("listing namespaces requires a parent subsystem".into())
        })?;
        ctx.subsystems
            .get(parent)
            .ok_or_else(|| missing_subsystem(parent))
    }

    fn scope_of(&self, ctx: &BridgeContext, stored: &NvmeNamespace) -> Result<NvmeSubsystem> {
        let subsystem_id = &stored.spec.subsystem_id;
        ctx.subsystems
            .get(subsystem_id)
            .ok_or_else(|| missing_subsystem(subsystem_id))
    }

    async fn fetch(
        &self,
        ctx: &BridgeContext,
        subsystem: &NvmeSubsystem,
    ) -> Result<Vec<NamespaceRecord>> {
        let records: Vec<SubsystemRecord> =
            ctx.rpc.call_without_params(methods::NVMF_GET_SUBSYSTEMS).await?;
        records
            .into_iter()
            .find(|r| r.nqn == subsystem.spec.nqn)
            .map(|r| r.namespaces)
            .ok_or_else(|| missing_subsystem(&subsystem.spec.id))
    }

    fn matches(
        &self,
        subsystem: &NvmeSubsystem,
        stored: &NvmeNamespace,
        record: &NamespaceRecord,
    ) -> bool {
        stored.spec.subsystem_id == subsystem.spec.id && stored.spec.host_nsid == record.nsid
    }

    fn shape(&self, subsystem: &NvmeSubsystem, record: NamespaceRecord) -> NvmeNamespace {
        NvmeNamespace {
            spec: NvmeNamespaceSpec {
                id: ResourceId::default(),
                subsystem_id: subsystem.spec.id.clone(),
                host_nsid: record.nsid,
                volume_id: ResourceId::new(record.bdev_name),
                eui64: eui64_from_hex(record.eui64.as_deref()),
                uuid: record.uuid,
                nguid: record.nguid,
            },
            status: Some(NvmeNamespaceStatus::attached(subsystem.spec.nqn.clone())),
        }
    }

    fn lookup_failure(&self, stored: &NvmeNamespace, _found: usize) -> String {
        format!("Could not find NSID: {}", stored.spec.host_nsid)
    }

    fn refresh(&self, mut stored: NvmeNamespace, _record: NamespaceRecord) -> NvmeNamespace {
        let nqn = stored
            .status
            .take()
            .map(|s| s.subsystem_nqn)
            .unwrap_or_default();
        stored.status = Some(NvmeNamespaceStatus::attached(nqn));
        stored
    }

    async fn stats(&self, ctx: &BridgeContext, stored: &NvmeNamespace) -> Result<VolumeStats> {
        stats::volume_stats(ctx, &stored.spec.volume_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eui64_hex_conversion() {
        assert_eq!(eui64_to_hex(0), None);
        assert_eq!(eui64_to_hex(0x1234).as_deref(), Some("0000000000001234"));
        assert_eq!(eui64_from_hex(Some("0000000000001234")), 0x1234);
        assert_eq!(eui64_from_hex(Some("FFFFFFFFFFFFFFFF")), -1);
        assert_eq!(eui64_from_hex(Some("not-hex")), 0);
        assert_eq!(eui64_from_hex(None), 0);
    }
}
