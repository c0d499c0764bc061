//! Virtio-blk endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use spdk_bridge_control::StorageFrontend;
use spdk_bridge_core::VirtioBlk;

use super::{resource_id, DeleteQuery, ListQuery};
use crate::error::ApiError;
use crate::state::GatewayState;

/// Create a virtio-blk controller.
///
/// # Errors
///
/// Returns an error if the engine refuses the controller.
pub async fn create_virtio_blk<F>(
    State(state): State<Arc<GatewayState<F>>>,
    Json(body): Json<VirtioBlk>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let virtio_blk = state.frontend.create_virtio_blk(body).await?;
    Ok((StatusCode::CREATED, Json(virtio_blk)))
}

/// Delete a virtio-blk controller.
///
/// # Errors
///
/// Returns an error if the controller does not exist and `allow_missing` is
/// not set, or the engine fails.
pub async fn delete_virtio_blk<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    state
        .frontend
        .delete_virtio_blk(query.into_request(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update a virtio-blk controller.
///
/// # Errors
///
/// Always fails with `unimplemented`.
pub async fn update_virtio_blk<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Json(mut body): Json<VirtioBlk>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    body.id = resource_id(path)?;
    let virtio_blk = state.frontend.update_virtio_blk(body).await?;
    Ok(Json(virtio_blk))
}

/// List virtio-blk controllers.
///
/// # Errors
///
/// Returns an error for invalid paging or an engine failure.
pub async fn list_virtio_blks<F>(
    State(state): State<Arc<GatewayState<F>>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let page = state
        .frontend
        .list_virtio_blks(query.into_request(None))
        .await?;
    Ok(Json(page))
}

/// Get a virtio-blk controller.
///
/// # Errors
///
/// Returns an error if the controller is not registered or the engine does
/// not report exactly one match.
pub async fn get_virtio_blk<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let virtio_blk = state.frontend.get_virtio_blk(&id).await?;
    Ok(Json(virtio_blk))
}

/// Get the I/O statistics of a controller's backing volume.
///
/// # Errors
///
/// Returns an error if the controller is not registered or the engine fails.
pub async fn virtio_blk_stats<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let stats = state.frontend.virtio_blk_stats(&id).await?;
    Ok(Json(stats))
}
