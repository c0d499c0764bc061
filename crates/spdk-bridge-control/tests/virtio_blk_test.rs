//! Virtio-blk lifecycle against a scripted engine.

mod common;

use common::*;
use spdk_bridge_control::{DeleteRequest, ErrorCode, ListRequest, ResourceId, StorageFrontend};

const ONE_CONTROLLER_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":[{"ctrlr":"virtio-blk-42","cpumask":"0x1","delay_base_us":0,"iops_threshold":60000,"socket":"/var/tmp/virtio-blk-42","backend_specific":{"block":{"readonly":false,"bdev":"Malloc42"}}}]}"#;
const TWO_CONTROLLERS_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":[{"ctrlr":"virtio-blk-42","cpumask":"0x1","delay_base_us":0,"iops_threshold":60000,"socket":"/var/tmp/virtio-blk-42"},{"ctrlr":"VblkEmu0pf0","cpumask":"0x1","delay_base_us":0,"iops_threshold":60000,"socket":"/var/tmp/VblkEmu0pf0"}]}"#;

#[tokio::test]
async fn create_names_controller_after_id() {
    let (service, mock) = frontend(&[TRUE_REPLY]);

    let created = service
        .create_virtio_blk(virtio_blk("virtio-blk-42"))
        .await
        .unwrap();

    assert_eq!(created, virtio_blk("virtio-blk-42"));
    let request = &mock.requests()[0];
    assert_eq!(request["method"], "vhost_create_blk_controller");
    assert_eq!(request["params"]["ctrlr"], "virtio-blk-42");
    assert_eq!(request["params"]["dev_name"], "Malloc42");
}

#[tokio::test]
async fn create_is_idempotent() {
    let (service, mock) = frontend(&[TRUE_REPLY]);

    service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();
    service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();

    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn create_rejected_by_engine() {
    let (service, _mock) = frontend(&[FALSE_REPLY]);

    let err = service
        .create_virtio_blk(virtio_blk("virtio-blk-42"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Could not create virtio-blk: virtio-blk-42");
    assert!(service.context().virtio_blks.is_empty());
}

#[tokio::test]
async fn delete_controller() {
    let (service, mock) = frontend(&[TRUE_REPLY, TRUE_REPLY]);
    service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();

    service
        .delete_virtio_blk(DeleteRequest::new("virtio-blk-42"))
        .await
        .unwrap();

    assert!(service.context().virtio_blks.is_empty());
    assert_eq!(mock.methods()[1], "vhost_delete_controller");
    assert_eq!(mock.requests()[1]["params"]["ctrlr"], "virtio-blk-42");

    let err = service
        .delete_virtio_blk(DeleteRequest::new("virtio-blk-42"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_is_unimplemented() {
    let (service, _mock) = frontend(&[]);

    let err = service
        .update_virtio_blk(virtio_blk("virtio-blk-42"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "UpdateVirtioBlk method is not implemented");
}

#[tokio::test]
async fn list_controllers() {
    let (service, mock) = frontend(&[TRUE_REPLY, TWO_CONTROLLERS_REPLY]);
    let registered = service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();

    let page = service.list_virtio_blks(ListRequest::default()).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0], registered);
    assert_eq!(page.items[1].id, ResourceId::new("VblkEmu0pf0"));
    assert!(page.next_page_token.is_empty());
    // Listing asks for every controller
    assert!(mock.requests()[1].get("params").is_none());
}

#[tokio::test]
async fn get_queries_by_name() {
    let (service, mock) = frontend(&[TRUE_REPLY, ONE_CONTROLLER_REPLY]);
    let registered = service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();

    let got = service
        .get_virtio_blk(&ResourceId::new("virtio-blk-42"))
        .await
        .unwrap();

    assert_eq!(got, registered);
    assert_eq!(mock.requests()[1]["params"]["name"], "virtio-blk-42");
}

#[tokio::test]
async fn get_needs_exactly_one_controller() {
    let (service, _mock) = frontend(&[TRUE_REPLY, TWO_CONTROLLERS_REPLY]);
    service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();

    let err = service
        .get_virtio_blk(&ResourceId::new("virtio-blk-42"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "expecting exactly 1 result, got 2");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn stats_pass_counters_through() {
    let iostat = r#"{"jsonrpc":"2.0","id":{id},"result":{"tick_rate":2490000000,"bdevs":[{"name":"Malloc42","bytes_read":-1,"num_read_ops":-1,"bytes_written":-1,"num_write_ops":-1,"bytes_unmapped":-1,"num_unmap_ops":-1,"read_latency_ticks":-1,"write_latency_ticks":-1}]}}"#;
    let (service, mock) = frontend(&[TRUE_REPLY, iostat]);
    service.create_virtio_blk(virtio_blk("virtio-blk-42")).await.unwrap();

    let stats = service
        .virtio_blk_stats(&ResourceId::new("virtio-blk-42"))
        .await
        .unwrap();

    assert_eq!(stats, spdk_bridge_control::VolumeStats::unavailable());
    assert_eq!(mock.requests()[1]["params"]["name"], "Malloc42");
}
