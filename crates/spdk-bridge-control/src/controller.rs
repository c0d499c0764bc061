//! NVMe controllers.
//!
//! A controller is a listener attached to its parent subsystem. When a TCP
//! listen address is configured every controller listens there; otherwise
//! the controller is exposed as a vfio-user PCIe function. The natural key
//! is the listener address.

use std::net::IpAddr;

use async_trait::async_trait;
use spdk_bridge_core::{
    Listener, NvmeController, NvmeControllerSpec, NvmeControllerStatus, NvmeSubsystem,
    PciEndpoint, ResourceId, VolumeStats,
};
use spdk_bridge_rpc::methods::{self, ListenAddress, ListenerParams, ListenerRecord, SubsystemParams};

use crate::context::BridgeContext;
use crate::error::{ControlError, Result};
use crate::orchestrator::ResourceKind;
use crate::registry::Registry;
use crate::stats;

/// Controller capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerKind;

/// Render a listener the way the engine expects it.
#[must_use]
pub fn engine_address(listener: &Listener, vfio_user_root: &str) -> ListenAddress {
    match listener {
        Listener::Tcp { addr, port } => ListenAddress {
            trtype: ListenAddress::TRTYPE_TCP.to_string(),
            adrfam: Some(
                match addr {
                    IpAddr::V4(_) => ListenAddress::ADRFAM_IPV4,
                    IpAddr::V6(_) => ListenAddress::ADRFAM_IPV6,
                }
                .to_string(),
            ),
            traddr: addr.to_string(),
            trsvcid: Some(port.to_string()),
        },
        Listener::Pcie(ep) => ListenAddress {
            trtype: ListenAddress::TRTYPE_VFIOUSER.to_string(),
            adrfam: None,
            traddr: format!(
                "{}/pf{}-vf{}",
                vfio_user_root.trim_end_matches('/'),
                ep.physical_function,
                ep.virtual_function
            ),
            trsvcid: None,
        },
    }
}

/// Read a listener back from the engine's representation.
///
/// Returns `None` for transports the bridge does not create.
#[must_use]
pub fn listener_from_address(address: &ListenAddress) -> Option<Listener> {
    if address.trtype.eq_ignore_ascii_case(ListenAddress::TRTYPE_TCP) {
        let addr: IpAddr = address.traddr.parse().ok()?;
        let port: u16 = address.trsvcid.as_deref()?.parse().ok()?;
        return Some(Listener::Tcp { addr, port });
    }
    if address.trtype.eq_ignore_ascii_case(ListenAddress::TRTYPE_VFIOUSER) {
        let name = address.traddr.rsplit('/').next()?;
        let (pf, vf) = name.strip_prefix("pf")?.split_once("-vf")?;
        return Some(Listener::pcie(PciEndpoint {
            physical_function: pf.parse().ok()?,
            virtual_function: vf.parse().ok()?,
        }));
    }
    None
}

fn listener_for(ctx: &BridgeContext, resource: &NvmeController) -> Result<Listener> {
    if let Some(addr) = &ctx.config.tcp_listen_address {
        return Ok(Listener::resolve_tcp(addr));
    }
    resource.spec.pcie_id.map(Listener::pcie).ok_or_else(|| {
        ControlError::InvalidArgument(format!(
            "controller {} needs a PCIe endpoint when no TCP listen address is configured",
            resource.spec.id
        ))
    })
}

fn stored_listener(stored: &NvmeController) -> Option<&Listener> {
    stored.status.as_ref().and_then(|s| s.listener.as_ref())
}

/// Listener and subsystem NQN recorded when the controller was created.
fn attachment(stored: &NvmeController) -> Result<(&Listener, &str)> {
    stored
        .status
        .as_ref()
        .and_then(|s| Some((s.listener.as_ref()?, s.subsystem_nqn.as_str())))
        .filter(|(_, nqn)| !nqn.is_empty())
        .ok_or_else(|| {
            ControlError::Internal(format!("controller {} has no listener", stored.spec.id))
        })
}

#[async_trait]
impl ResourceKind for ControllerKind {
    type Resource = NvmeController;
    type Parent = NvmeSubsystem;
    type Scope = NvmeSubsystem;
    type Record = ListenerRecord;

    const NAME: &'static str = "NvmeController";

    fn registry<'a>(&self, ctx: &'a BridgeContext) -> &'a Registry<NvmeController> {
        &ctx.controllers
    }

    fn id<'r>(&self, resource: &'r NvmeController) -> &'r ResourceId {
        &resource.spec.id
    }

    fn parent(&self, ctx: &BridgeContext, resource: &NvmeController) -> Result<NvmeSubsystem> {
        let subsystem_id = &resource.spec.subsystem_id;
        ctx.subsystems
            .get(subsystem_id)
            .ok_or_else(|| ControlError::NotFound(subsystem_id.to_string()))
    }

    async fn create(
        &self,
        ctx: &BridgeContext,
        subsystem: NvmeSubsystem,
        mut resource: NvmeController,
    ) -> Result<NvmeController> {
        let listener = listener_for(ctx, &resource)?;
        let params = ListenerParams {
            nqn: subsystem.spec.nqn.clone(),
            listen_address: engine_address(&listener, &ctx.config.vfio_user_root),
        };
        let added: bool = ctx
            .rpc
            .call(methods::NVMF_SUBSYSTEM_ADD_LISTENER, &params)
            .await?;
        if !added {
            let msg = format!("Could not create CTRL: {}", resource.spec.id);
            tracing::warn!(nqn = %subsystem.spec.nqn, "{msg}");
            return Err(ControlError::EngineSignaledFalse(msg));
        }

        tracing::info!(
            controller_id = %resource.spec.id,
            nqn = %subsystem.spec.nqn,
            listener = %listener,
            "Created NVMe controller"
        );
        resource.spec.nvme_controller_id = -1;
        resource.status = Some(NvmeControllerStatus {
            active: true,
            subsystem_nqn: subsystem.spec.nqn,
            listener: Some(listener),
        });
        Ok(resource)
    }

    async fn delete(&self, ctx: &BridgeContext, stored: &NvmeController) -> Result<bool> {
        let (listener, nqn) = attachment(stored)?;
        let params = ListenerParams {
            nqn: nqn.to_string(),
            listen_address: engine_address(listener, &ctx.config.vfio_user_root),
        };
        Ok(ctx
            .rpc
            .call(methods::NVMF_SUBSYSTEM_REMOVE_LISTENER, &params)
            .await?)
    }

    fn scope(&self, ctx: &BridgeContext, parent: Option<&ResourceId>) -> Result<NvmeSubsystem> {
        let parent = parent.ok_or_else(|| {
            ControlError::InvalidArgument("listing controllers requires a parent subsystem".into())
        })?;
        ctx.subsystems
            .get(parent)
            .ok_or_else(|| ControlError::NotFound(parent.to_string()))
    }

    fn scope_of(&self, ctx: &BridgeContext, stored: &NvmeController) -> Result<NvmeSubsystem> {
        let subsystem_id = &stored.spec.subsystem_id;
        ctx.subsystems.get(subsystem_id).ok_or_else(|| {
            ControlError::Unknown(format!("unable to find subsystem {subsystem_id}"))
        })
    }

    async fn fetch(
        &self,
        ctx: &BridgeContext,
        subsystem: &NvmeSubsystem,
    ) -> Result<Vec<ListenerRecord>> {
        let params = SubsystemParams {
            nqn: subsystem.spec.nqn.clone(),
        };
        Ok(ctx
            .rpc
            .call(methods::NVMF_SUBSYSTEM_GET_LISTENERS, &params)
            .await?)
    }

    fn matches(
        &self,
        subsystem: &NvmeSubsystem,
        stored: &NvmeController,
        record: &ListenerRecord,
    ) -> bool {
        stored.spec.subsystem_id == subsystem.spec.id
            && stored_listener(stored).is_some_and(|l| {
                listener_from_address(&record.address).as_ref() == Some(l)
            })
    }

    fn shape(&self, subsystem: &NvmeSubsystem, record: ListenerRecord) -> NvmeController {
        let listener = listener_from_address(&record.address);
        let pcie_id = match listener {
            Some(Listener::Pcie(ep)) => Some(ep),
            _ => None,
        };
        NvmeController {
            spec: NvmeControllerSpec {
                id: ResourceId::default(),
                subsystem_id: subsystem.spec.id.clone(),
                pcie_id,
                nvme_controller_id: -1,
            },
            status: Some(NvmeControllerStatus {
                active: true,
                subsystem_nqn: subsystem.spec.nqn.clone(),
                listener,
            }),
        }
    }

    fn lookup_failure(&self, stored: &NvmeController, _found: usize) -> String {
        format!("Could not find listener for CTRL: {}", stored.spec.id)
    }

    fn refresh(&self, mut stored: NvmeController, record: ListenerRecord) -> NvmeController {
        let active = !matches!(record.ana_state.as_deref(), Some("inaccessible"));
        let listener = listener_from_address(&record.address);
        let subsystem_nqn = stored
            .status
            .take()
            .map(|s| s.subsystem_nqn)
            .unwrap_or_default();
        stored.status = Some(NvmeControllerStatus {
            active,
            subsystem_nqn,
            listener,
        });
        stored
    }

    async fn stats(&self, ctx: &BridgeContext, stored: &NvmeController) -> Result<VolumeStats> {
        stats::nvmf_stats(ctx, &stored.spec.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_addresses_round_trip() {
        let v4 = Listener::resolve_tcp("10.10.10.10:4420");
        let rendered = engine_address(&v4, "/var/tmp/vfio-user");
        assert_eq!(rendered.trtype, "TCP");
        assert_eq!(rendered.adrfam.as_deref(), Some("IPv4"));
        assert_eq!(rendered.traddr, "10.10.10.10");
        assert_eq!(rendered.trsvcid.as_deref(), Some("4420"));
        assert_eq!(listener_from_address(&rendered), Some(v4));

        let v6 = Listener::resolve_tcp("[::1]:4420");
        let rendered = engine_address(&v6, "/var/tmp/vfio-user");
        assert_eq!(rendered.adrfam.as_deref(), Some("IPv6"));
        assert_eq!(rendered.traddr, "::1");
        assert_eq!(listener_from_address(&rendered), Some(v6));
    }

    #[test]
    fn pcie_address_uses_vfio_user_root() {
        let listener = Listener::pcie(PciEndpoint {
            physical_function: 1,
            virtual_function: 2,
        });
        let rendered = engine_address(&listener, "/var/tmp/vfio-user/");
        assert_eq!(rendered.trtype, "VFIOUSER");
        assert_eq!(rendered.traddr, "/var/tmp/vfio-user/pf1-vf2");
        assert!(rendered.adrfam.is_none());
        assert!(rendered.trsvcid.is_none());
        assert_eq!(listener_from_address(&rendered), Some(listener));
    }

    #[test]
    fn unknown_transport_is_ignored() {
        let address = ListenAddress {
            trtype: "RDMA".to_string(),
            adrfam: Some("IPv4".to_string()),
            traddr: "10.0.0.1".to_string(),
            trsvcid: Some("4420".to_string()),
        };
        assert!(listener_from_address(&address).is_none());
    }
}
