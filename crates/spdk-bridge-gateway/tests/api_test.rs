//! End-to-end requests through the router against a scripted engine.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use spdk_bridge_control::{BridgeConfig, FrontendService};
use spdk_bridge_gateway::{create_router, GatewayConfig, GatewayState};
use spdk_bridge_rpc::{MockTransport, RpcClient};

const TRUE_REPLY: &str = r#"{"id":{id},"error":{"code":0,"message":""},"result":true}"#;
const VERSION_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":{"version":"SPDK v20.10","fields":{"major":20,"minor":10,"patch":0,"suffix":""}}}"#;
const SUBSYSTEMS_REPLY: &str = r#"{"jsonrpc":"2.0","id":{id},"result":[{"nqn":"nqn.2014-08.org.nvmexpress.discovery","subtype":"Discovery"},{"nqn":"nqn.2022-09.io.spdk:opi1","subtype":"NVMe","serial_number":"OpiSerialNumber","model_number":"OpiModelNumber","max_namespaces":32},{"nqn":"nqn.2022-09.io.spdk:opi2","subtype":"NVMe","max_namespaces":32}]}"#;

fn setup(replies: &[&str]) -> (Router, MockTransport) {
    let mock = MockTransport::with_replies(replies.iter().copied());
    let frontend = Arc::new(
        FrontendService::with_client(RpcClient::new(mock.clone()), BridgeConfig::default())
            .unwrap(),
    );
    let app = create_router(GatewayState::new(frontend, GatewayConfig::default()));
    (app, mock)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn subsystem_body() -> Value {
    json!({
        "spec": {
            "id": "subsystem-test",
            "nqn": "nqn.2022-09.io.spdk:opi1",
            "serial_number": "OpiSerialNumber",
            "model_number": "OpiModelNumber",
            "max_namespaces": 0
        }
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_does_not_touch_engine() {
    let (app, mock) = setup(&[]);

    let (status, body) = send(app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "serving");
    assert_eq!(mock.call_count(), 0);
}

// =============================================================================
// Subsystems
// =============================================================================

#[tokio::test]
async fn create_then_get_subsystem() {
    let (app, mock) = setup(&[TRUE_REPLY, VERSION_REPLY, SUBSYSTEMS_REPLY]);

    let (status, created) = send(
        app.clone(),
        Method::POST,
        "/v1/subsystems",
        Some(subsystem_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"]["firmware_revision"], "SPDK v20.10");

    let (status, got) = send(app, Method::GET, "/v1/subsystems/subsystem-test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(got, created);
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn list_subsystems_pages() {
    let (app, _mock) = setup(&[SUBSYSTEMS_REPLY, SUBSYSTEMS_REPLY]);

    let (status, first) = send(app.clone(), Method::GET, "/v1/subsystems?page_size=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().unwrap().len(), 1);
    assert_eq!(first["items"][0]["spec"]["nqn"], "nqn.2022-09.io.spdk:opi1");
    let token = first["next_page_token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let uri = format!("/v1/subsystems?page_size=1&page_token={token}");
    let (status, second) = send(app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["items"][0]["spec"]["nqn"], "nqn.2022-09.io.spdk:opi2");
    assert_eq!(second["next_page_token"], "");
}

#[tokio::test]
async fn negative_page_size_is_bad_request() {
    let (app, mock) = setup(&[SUBSYSTEMS_REPLY]);

    let (status, body) = send(app, Method::GET, "/v1/subsystems?page_size=-10", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_argument");
    assert_eq!(body["error"]["message"], "negative PageSize is not allowed");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn unknown_page_token_is_not_found() {
    let (app, _mock) = setup(&[]);

    let (status, body) = send(
        app,
        Method::GET,
        "/v1/subsystems?page_token=unknown-pagination-token",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn delete_subsystem_allow_missing() {
    let (app, _mock) = setup(&[]);

    let (status, body) = send(
        app.clone(),
        Method::DELETE,
        "/v1/subsystems/unknown-id",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "unable to find key unknown-id");

    let (status, _) = send(
        app,
        Method::DELETE,
        "/v1/subsystems/unknown-id?allow_missing=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn update_is_not_implemented() {
    let (app, _mock) = setup(&[]);

    let (status, body) = send(
        app,
        Method::PATCH,
        "/v1/subsystems/subsystem-test",
        Some(subsystem_body()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "unimplemented");
    assert_eq!(
        body["error"]["message"],
        "UpdateNvmeSubsystem method is not implemented"
    );
}

#[tokio::test]
async fn engine_failure_is_bad_gateway() {
    let (app, _mock) = setup(&[r#"{"id":0,"error":{"code":0,"message":""},"result":true}"#]);

    let (status, body) = send(app, Method::POST, "/v1/subsystems", Some(subsystem_body())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "unknown");
    assert_eq!(
        body["error"]["message"],
        "nvmf_create_subsystem: json response ID mismatch"
    );
}

// =============================================================================
// Children and virtio-blk
// =============================================================================

#[tokio::test]
async fn controller_needs_registered_subsystem() {
    let (app, mock) = setup(&[]);
    let body = json!({
        "spec": {
            "id": "controller-test",
            "subsystem_id": "subsystem-missing",
            "pcie_id": {"physical_function": 1, "virtual_function": 2},
            "nvme_controller_id": 17
        }
    });

    let (status, body) = send(app, Method::POST, "/v1/controllers", Some(body)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "unable to find key subsystem-missing");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn list_namespaces_requires_registered_subsystem() {
    let (app, _mock) = setup(&[]);

    let (status, body) = send(
        app,
        Method::GET,
        "/v1/subsystems/subsystem-missing/namespaces",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"]["message"],
        "unable to find subsystem subsystem-missing"
    );
}

#[tokio::test]
async fn virtio_blk_lifecycle() {
    let (app, mock) = setup(&[TRUE_REPLY, TRUE_REPLY]);
    let body = json!({
        "id": "virtio-blk-42",
        "pcie_id": {"physical_function": 42, "virtual_function": 0},
        "volume_id": "Malloc42",
        "max_io_qps": 1
    });

    let (status, created) = send(app.clone(), Method::POST, "/v1/virtio-blks", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, body);

    let (status, _) = send(app, Method::DELETE, "/v1/virtio-blks/virtio-blk-42", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        mock.methods(),
        ["vhost_create_blk_controller", "vhost_delete_controller"]
    );
}

#[tokio::test]
async fn stats_of_unknown_resource() {
    let (app, _mock) = setup(&[]);

    let (status, body) = send(app, Method::GET, "/v1/namespaces/unknown-id/stats", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}
