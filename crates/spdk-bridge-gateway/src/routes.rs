//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use spdk_bridge_control::StorageFrontend;

use crate::handlers::{self, nvme, virtio};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
///
/// ## NVMe subsystems
/// - `GET /v1/subsystems` - List subsystems
/// - `POST /v1/subsystems` - Create subsystem
/// - `GET /v1/subsystems/{id}` - Get subsystem
/// - `PATCH /v1/subsystems/{id}` - Update subsystem
/// - `DELETE /v1/subsystems/{id}` - Delete subsystem
/// - `GET /v1/subsystems/{id}/stats` - Subsystem statistics
/// - `GET /v1/subsystems/{id}/controllers` - List controllers
/// - `GET /v1/subsystems/{id}/namespaces` - List namespaces
///
/// ## NVMe controllers and namespaces
/// - `POST /v1/controllers`, `POST /v1/namespaces` - Create
/// - `GET|PATCH|DELETE /v1/{controllers,namespaces}/{id}`
/// - `GET /v1/{controllers,namespaces}/{id}/stats`
///
/// ## Virtio-blk
/// - `GET /v1/virtio-blks` - List
/// - `POST /v1/virtio-blks` - Create
/// - `GET|PATCH|DELETE /v1/virtio-blks/{id}`
/// - `GET /v1/virtio-blks/{id}/stats`
pub fn create_router<F>(state: GatewayState<F>) -> Router
where
    F: StorageFrontend + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health))
        // Subsystems
        .route(
            "/v1/subsystems",
            get(nvme::list_subsystems::<F>).post(nvme::create_subsystem::<F>),
        )
        .route(
            "/v1/subsystems/{id}",
            get(nvme::get_subsystem::<F>)
                .patch(nvme::update_subsystem::<F>)
                .delete(nvme::delete_subsystem::<F>),
        )
        .route(
            "/v1/subsystems/{id}/stats",
            get(nvme::subsystem_stats::<F>),
        )
        .route(
            "/v1/subsystems/{id}/controllers",
            get(nvme::list_controllers::<F>),
        )
        .route(
            "/v1/subsystems/{id}/namespaces",
            get(nvme::list_namespaces::<F>),
        )
        // Controllers
        .route("/v1/controllers", post(nvme::create_controller::<F>))
        .route(
            "/v1/controllers/{id}",
            get(nvme::get_controller::<F>)
                .patch(nvme::update_controller::<F>)
                .delete(nvme::delete_controller::<F>),
        )
        .route(
            "/v1/controllers/{id}/stats",
            get(nvme::controller_stats::<F>),
        )
        // Namespaces
        .route("/v1/namespaces", post(nvme::create_namespace::<F>))
        .route(
            "/v1/namespaces/{id}",
            get(nvme::get_namespace::<F>)
                .patch(nvme::update_namespace::<F>)
                .delete(nvme::delete_namespace::<F>),
        )
        .route(
            "/v1/namespaces/{id}/stats",
            get(nvme::namespace_stats::<F>),
        )
        // Virtio-blk
        .route(
            "/v1/virtio-blks",
            get(virtio::list_virtio_blks::<F>).post(virtio::create_virtio_blk::<F>),
        )
        .route(
            "/v1/virtio-blks/{id}",
            get(virtio::get_virtio_blk::<F>)
                .patch(virtio::update_virtio_blk::<F>)
                .delete(virtio::delete_virtio_blk::<F>),
        )
        .route(
            "/v1/virtio-blks/{id}/stats",
            get(virtio::virtio_blk_stats::<F>),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
