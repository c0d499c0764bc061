//! NVMe namespace lifecycle against a scripted engine.

mod common;

use common::*;
use spdk_bridge_control::{
    DeleteRequest, ErrorCode, FrontendService, ListRequest, ResourceId, StorageFrontend,
};
use spdk_bridge_core::{PciOperState, PciState};
use spdk_bridge_rpc::MockTransport;

const NSID_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":12}"#;
const IOSTAT_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":{"tick_rate":2490000000,"ticks":1000,"bdevs":[{"name":"Malloc1","bytes_read":36864,"num_read_ops":2,"bytes_written":0,"num_write_ops":0,"bytes_unmapped":0,"num_unmap_ops":0,"read_latency_ticks":178904,"write_latency_ticks":0,"unmap_latency_ticks":0}]}}"#;

/// Register `namespace-test` with nsid 12 under `subsystem-test`.
async fn setup(extra: &[&str]) -> (FrontendService, MockTransport) {
    let mut replies = vec![TRUE_REPLY, VERSION_REPLY, NSID_REPLY];
    replies.extend_from_slice(extra);
    let (service, mock) = frontend(&replies);
    register_subsystem(&service).await;
    service
        .create_nvme_namespace(namespace("namespace-test", "subsystem-test", 0))
        .await
        .unwrap();
    (service, mock)
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_takes_engine_nsid() {
    let (service, mock) = setup(&[]).await;

    let stored = service
        .context()
        .namespaces
        .get(&ResourceId::new("namespace-test"))
        .unwrap();
    assert_eq!(stored.spec.host_nsid, 12);
    let status = stored.status.unwrap();
    assert_eq!(status.subsystem_nqn, NQN);
    assert_eq!(status.pci_state, PciState::Enabled);
    assert_eq!(status.pci_oper_state, PciOperState::Online);

    let params = &mock.requests()[2]["params"];
    assert_eq!(params["nqn"], NQN);
    assert_eq!(params["namespace"]["bdev_name"], "Malloc1");
    // Zero lets the engine choose
    assert!(params["namespace"].get("nsid").is_none());
}

#[tokio::test]
async fn create_forwards_requested_identifiers() {
    let (service, mock) = frontend(&[TRUE_REPLY, VERSION_REPLY, NSID_REPLY]);
    register_subsystem(&service).await;

    let mut request = namespace("namespace-test", "subsystem-test", 12);
    request.spec.eui64 = 0x1234;
    request.spec.uuid = Some("611c1380-2d99-4e1d-ab12-1f38a9887929".to_string());
    service.create_nvme_namespace(request).await.unwrap();

    let params = &mock.requests()[2]["params"]["namespace"];
    assert_eq!(params["nsid"], 12);
    assert_eq!(params["eui64"], "0000000000001234");
    assert_eq!(params["uuid"], "611c1380-2d99-4e1d-ab12-1f38a9887929");
}

#[tokio::test]
async fn create_rejects_non_positive_nsid() {
    for reply in [
        r#"{"jsonrpc":"2.0","id":{id},"result":0}"#,
        r#"{"jsonrpc":"2.0","id":{id},"result":-1}"#,
    ] {
        let (service, _mock) = frontend(&[TRUE_REPLY, VERSION_REPLY, reply]);
        register_subsystem(&service).await;

        let err = service
            .create_nvme_namespace(namespace("namespace-test", "subsystem-test", 0))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Could not create NS: namespace-test");
        assert!(service.context().namespaces.is_empty());
    }
}

#[tokio::test]
async fn create_requires_registered_subsystem() {
    let (service, mock) = frontend(&[NSID_REPLY]);

    let err = service
        .create_nvme_namespace(namespace("namespace-test", "subsystem-missing", 0))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn create_is_idempotent() {
    let (service, mock) = setup(&[]).await;

    let again = service
        .create_nvme_namespace(namespace("namespace-test", "subsystem-test", 0))
        .await
        .unwrap();

    assert_eq!(again.spec.host_nsid, 12);
    assert_eq!(mock.call_count(), 3);
}

// =============================================================================
// Delete and update
// =============================================================================

#[tokio::test]
async fn delete_detaches_namespace() {
    let (service, mock) = setup(&[TRUE_REPLY]).await;

    service
        .delete_nvme_namespace(DeleteRequest::new("namespace-test"))
        .await
        .unwrap();

    assert!(service.context().namespaces.is_empty());
    let request = &mock.requests()[3];
    assert_eq!(request["method"], "nvmf_subsystem_remove_ns");
    assert_eq!(request["params"]["nqn"], NQN);
    assert_eq!(request["params"]["nsid"], 12);
}

#[tokio::test]
async fn delete_uses_recorded_subsystem_nqn() {
    let (service, mock) = setup(&[TRUE_REPLY]).await;
    service
        .context()
        .subsystems
        .remove(&ResourceId::new("subsystem-test"));

    service
        .delete_nvme_namespace(DeleteRequest::new("namespace-test"))
        .await
        .unwrap();

    assert!(service.context().namespaces.is_empty());
    assert_eq!(mock.requests()[3]["params"]["nqn"], NQN);
    assert_eq!(mock.requests()[3]["params"]["nsid"], 12);
}

#[tokio::test]
async fn delete_missing_namespace_allowed() {
    let (service, mock) = frontend(&[]);

    service
        .delete_nvme_namespace(DeleteRequest::allow_missing("unknown-id"))
        .await
        .unwrap();
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn update_is_unimplemented() {
    let (service, _mock) = frontend(&[]);

    let err = service
        .update_nvme_namespace(namespace("namespace-test", "subsystem-test", 12))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Unimplemented);
}

// =============================================================================
// List, get and stats
// =============================================================================

#[tokio::test]
async fn list_namespaces_of_subsystem() {
    let (service, _mock) = setup(&[SUBSYSTEMS_REPLY]).await;

    let page = service
        .list_nvme_namespaces(ListRequest::under("subsystem-test"))
        .await
        .unwrap();

    let nsids: Vec<i32> = page.items.iter().map(|n| n.spec.host_nsid).collect();
    assert_eq!(nsids, [11, 12, 13]);
    // nsid 12 is the registered namespace
    assert_eq!(page.items[1].spec.id, ResourceId::new("namespace-test"));
    assert!(page.items[0].spec.id.is_empty());
    assert_eq!(page.items[0].spec.volume_id, ResourceId::new("Malloc0"));
    assert!(page.next_page_token.is_empty());
}

#[tokio::test]
async fn list_requires_registered_parent() {
    let (service, mock) = frontend(&[]);

    let err = service
        .list_nvme_namespaces(ListRequest::under("subsystem-missing"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unable to find subsystem subsystem-missing");
    assert_eq!(err.code(), ErrorCode::Unknown);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn get_registered_namespace() {
    let (service, _mock) = setup(&[SUBSYSTEMS_REPLY]).await;

    let got = service
        .get_nvme_namespace(&ResourceId::new("namespace-test"))
        .await
        .unwrap();

    assert_eq!(got.spec.host_nsid, 12);
    assert!(got.status.is_some());
}

#[tokio::test]
async fn get_namespace_missing_from_engine() {
    let without_ns = r#"{"jsonrpc":"2.0","id":{id},"result":[{"nqn":"nqn.2022-09.io.spdk:opi3","subtype":"NVMe","namespaces":[]}]}"#;
    let (service, _mock) = setup(&[without_ns]).await;

    let err = service
        .get_nvme_namespace(&ResourceId::new("namespace-test"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Could not find NSID: 12");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn stats_come_from_backing_volume() {
    let (service, mock) = setup(&[IOSTAT_REPLY]).await;

    let stats = service
        .nvme_namespace_stats(&ResourceId::new("namespace-test"))
        .await
        .unwrap();

    assert_eq!(stats.read_bytes_count, 36864);
    assert_eq!(stats.read_ops_count, 2);
    assert_eq!(stats.read_latency_ticks, 178_904);
    assert_eq!(stats.write_ops_count, 0);
    let request = &mock.requests()[3];
    assert_eq!(request["method"], "bdev_get_iostat");
    assert_eq!(request["params"]["name"], "Malloc1");
}

#[tokio::test]
async fn stats_need_exactly_one_volume() {
    let none = r#"{"jsonrpc":"2.0","id":{id},"result":{"tick_rate":2490000000,"bdevs":[]}}"#;
    let (service, _mock) = setup(&[none]).await;

    let err = service
        .nvme_namespace_stats(&ResourceId::new("namespace-test"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "expecting exactly 1 result, got 0");
}
