//! Shared fixtures for control plane integration tests.

#![allow(dead_code)]

use spdk_bridge_control::{BridgeConfig, FrontendService, StorageFrontend};
use spdk_bridge_core::{
    NvmeController, NvmeControllerSpec, NvmeNamespace, NvmeNamespaceSpec, NvmeSubsystem,
    NvmeSubsystemSpec, PciEndpoint, VirtioBlk,
};
use spdk_bridge_rpc::{MockTransport, RpcClient};

pub const TRUE_REPLY: &str = r#"{"id":{id},"error":{"code":0,"message":""},"result":true}"#;
pub const FALSE_REPLY: &str = r#"{"id":{id},"error":{"code":0,"message":""},"result":false}"#;
pub const MISMATCH_REPLY: &str = r#"{"id":0,"error":{"code":0,"message":""},"result":true}"#;
pub const VERSION_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":{"version":"SPDK v20.10","fields":{"major":20,"minor":10,"patch":0,"suffix":""}}}"#;
pub const STATS_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":{"tick_rate":2490000000,"poll_groups":[{"name":"nvmf_tgt_poll_group_0","admin_qpairs":0,"io_qpairs":0,"current_admin_qpairs":0,"current_io_qpairs":0,"pending_bdev_io":0,"transports":[{"trtype":"TCP"},{"trtype":"VFIOUSER"}]}]}}"#;

pub const NQN: &str = "nqn.2022-09.io.spdk:opi3";

/// `nvmf_get_subsystems` reply: the discovery subsystem plus `NQN` with
/// namespaces 11, 12 and 13.
pub const SUBSYSTEMS_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":[{"nqn":"nqn.2014-08.org.nvmexpress.discovery","subtype":"Discovery","listen_addresses":[],"allow_any_host":true,"hosts":[]},{"nqn":"nqn.2022-09.io.spdk:opi3","subtype":"NVMe","listen_addresses":[{"transport":"TCP","trtype":"TCP","adrfam":"IPv4","traddr":"192.168.80.2","trsvcid":"4444"}],"allow_any_host":false,"hosts":[],"serial_number":"SPDK00000000000001","model_number":"SPDK_Controller1","max_namespaces":32,"min_cntlid":1,"max_cntlid":65519,"namespaces":[{"nsid":11,"bdev_name":"Malloc0","name":"Malloc0","uuid":"611c1380-2d99-4e1d-ab12-1f38a9887929"},{"nsid":12,"bdev_name":"Malloc1","name":"Malloc1"},{"nsid":13,"bdev_name":"Malloc2","name":"Malloc2"}]}]}"#;

/// A frontend over a scripted engine with default configuration.
pub fn frontend(replies: &[&str]) -> (FrontendService, MockTransport) {
    frontend_with_config(replies, BridgeConfig::default())
}

/// A frontend over a scripted engine with the given configuration.
pub fn frontend_with_config(
    replies: &[&str],
    config: BridgeConfig,
) -> (FrontendService, MockTransport) {
    let mock = MockTransport::with_replies(replies.iter().copied());
    let service = FrontendService::with_client(RpcClient::new(mock.clone()), config)
        .expect("valid bridge config");
    (service, mock)
}

pub fn subsystem(id: &str, nqn: &str) -> NvmeSubsystem {
    NvmeSubsystem {
        spec: NvmeSubsystemSpec {
            id: id.into(),
            nqn: nqn.to_string(),
            serial_number: "OpiSerialNumber".to_string(),
            model_number: "OpiModelNumber".to_string(),
            max_namespaces: 0,
        },
        status: None,
    }
}

pub fn controller(id: &str, subsystem_id: &str) -> NvmeController {
    NvmeController {
        spec: NvmeControllerSpec {
            id: id.into(),
            subsystem_id: subsystem_id.into(),
            pcie_id: Some(PciEndpoint {
                physical_function: 1,
                virtual_function: 2,
            }),
            nvme_controller_id: 17,
        },
        status: None,
    }
}

pub fn namespace(id: &str, subsystem_id: &str, host_nsid: i32) -> NvmeNamespace {
    NvmeNamespace {
        spec: NvmeNamespaceSpec {
            id: id.into(),
            subsystem_id: subsystem_id.into(),
            host_nsid,
            volume_id: "Malloc1".into(),
            uuid: None,
            nguid: None,
            eui64: 0,
        },
        status: None,
    }
}

pub fn virtio_blk(id: &str) -> VirtioBlk {
    VirtioBlk {
        id: id.into(),
        pcie_id: PciEndpoint {
            physical_function: 42,
            virtual_function: 0,
        },
        volume_id: "Malloc42".into(),
        max_io_qps: 1,
    }
}

/// Register `subsystem-test` for `NQN`, consuming two scripted replies.
pub async fn register_subsystem(service: &FrontendService) -> NvmeSubsystem {
    service
        .create_nvme_subsystem(subsystem("subsystem-test", NQN))
        .await
        .expect("subsystem fixture")
}

/// Replies consumed by [`register_subsystem`].
pub const REGISTER_SUBSYSTEM: [&str; 2] = [TRUE_REPLY, VERSION_REPLY];
