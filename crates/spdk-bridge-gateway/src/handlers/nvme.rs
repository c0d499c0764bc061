//! NVMe subsystem, controller and namespace endpoints.
//!
//! Controllers and namespaces are created from a flat collection and name
//! their subsystem in the body; they are listed under the subsystem.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use spdk_bridge_control::StorageFrontend;
use spdk_bridge_core::{NvmeController, NvmeNamespace, NvmeSubsystem};

use super::{resource_id, DeleteQuery, ListQuery};
use crate::error::ApiError;
use crate::state::GatewayState;

// =============================================================================
// Subsystems
// =============================================================================

/// Create a subsystem.
///
/// # Errors
///
/// Returns an error if the engine rejects the NQN or cannot be reached.
pub async fn create_subsystem<F>(
    State(state): State<Arc<GatewayState<F>>>,
    Json(body): Json<NvmeSubsystem>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let subsystem = state.frontend.create_nvme_subsystem(body).await?;
    Ok((StatusCode::CREATED, Json(subsystem)))
}

/// Delete a subsystem.
///
/// # Errors
///
/// Returns an error if the subsystem does not exist and `allow_missing` is
/// not set, or the engine fails.
pub async fn delete_subsystem<F>(
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
        .delete_nvme_subsystem(query.into_request(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update a subsystem.
///
/// # Errors
///
/// Always fails with `unimplemented`.
pub async fn update_subsystem<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Json(mut body): Json<NvmeSubsystem>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    body.spec.id = resource_id(path)?;
    let subsystem = state.frontend.update_nvme_subsystem(body).await?;
    Ok(Json(subsystem))
}

/// List subsystems.
///
/// # Errors
///
/// Returns an error for a negative page size, an unknown page token, or an
/// engine failure.
pub async fn list_subsystems<F>(
    State(state): State<Arc<GatewayState<F>>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let page = state
        .frontend
        .list_nvme_subsystems(query.into_request(None))
        .await?;
    Ok(Json(page))
}

/// Get a subsystem.
///
/// # Errors
///
/// Returns an error if the subsystem is not registered or the engine no
/// longer reports it.
pub async fn get_subsystem<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let subsystem = state.frontend.get_nvme_subsystem(&id).await?;
    Ok(Json(subsystem))
}

/// Get a subsystem's statistics.
///
/// # Errors
///
/// Returns an error if the subsystem is not registered or the engine fails.
pub async fn subsystem_stats<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let stats = state.frontend.nvme_subsystem_stats(&id).await?;
    Ok(Json(stats))
}

// =============================================================================
// Controllers
// =============================================================================

/// Create a controller under the subsystem named in the body.
///
/// # Errors
///
/// Returns an error if the subsystem is not registered or the engine
/// refuses the listener.
pub async fn create_controller<F>(
    State(state): State<Arc<GatewayState<F>>>,
    Json(body): Json<NvmeController>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let controller = state.frontend.create_nvme_controller(body).await?;
    Ok((StatusCode::CREATED, Json(controller)))
}

/// Delete a controller.
///
/// # Errors
///
/// Returns an error if the controller does not exist and `allow_missing` is
/// not set, or the engine fails.
pub async fn delete_controller<F>(
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
        .delete_nvme_controller(query.into_request(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update a controller.
///
/// # Errors
///
/// Always fails with `unimplemented`.
pub async fn update_controller<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Json(mut body): Json<NvmeController>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    body.spec.id = resource_id(path)?;
    let controller = state.frontend.update_nvme_controller(body).await?;
    Ok(Json(controller))
}

/// List the controllers of a subsystem.
///
/// # Errors
///
/// Returns an error if the subsystem is not registered, for invalid paging,
/// or an engine failure.
pub async fn list_controllers<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let parent = resource_id(path)?;
    let page = state
        .frontend
        .list_nvme_controllers(query.into_request(Some(parent)))
        .await?;
    Ok(Json(page))
}

/// Get a controller.
///
/// # Errors
///
/// Returns an error if the controller is not registered or its listener is
/// gone.
pub async fn get_controller<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let controller = state.frontend.get_nvme_controller(&id).await?;
    Ok(Json(controller))
}

/// Get a controller's statistics.
///
/// # Errors
///
/// Returns an error if the controller is not registered or the engine fails.
pub async fn controller_stats<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let stats = state.frontend.nvme_controller_stats(&id).await?;
    Ok(Json(stats))
}

// =============================================================================
// Namespaces
// =============================================================================

/// Attach a namespace to the subsystem named in the body.
///
/// # Errors
///
/// Returns an error if the subsystem is not registered or the engine does
/// not assign a namespace ID.
pub async fn create_namespace<F>(
    State(state): State<Arc<GatewayState<F>>>,
    Json(body): Json<NvmeNamespace>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let namespace = state.frontend.create_nvme_namespace(body).await?;
    Ok((StatusCode::CREATED, Json(namespace)))
}

/// Detach a namespace.
///
/// # Errors
///
/// Returns an error if the namespace does not exist and `allow_missing` is
/// not set, or the engine fails.
pub async fn delete_namespace<F>(
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
        .delete_nvme_namespace(query.into_request(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update a namespace.
///
/// # Errors
///
/// Always fails with `unimplemented`.
pub async fn update_namespace<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Json(mut body): Json<NvmeNamespace>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    body.spec.id = resource_id(path)?;
    let namespace = state.frontend.update_nvme_namespace(body).await?;
    Ok(Json(namespace))
}

/// List the namespaces of a subsystem.
///
/// # Errors
///
/// Returns an error if the subsystem is not registered, for invalid paging,
/// or an engine failure.
pub async fn list_namespaces<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let parent = resource_id(path)?;
    let page = state
        .frontend
        .list_nvme_namespaces(query.into_request(Some(parent)))
        .await?;
    Ok(Json(page))
}

/// Get a namespace.
///
/// # Errors
///
/// Returns an error if the namespace is not registered or no longer
/// attached.
pub async fn get_namespace<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let namespace = state.frontend.get_nvme_namespace(&id).await?;
    Ok(Json(namespace))
}

/// Get the I/O statistics of a namespace's backing volume.
///
/// # Errors
///
/// Returns an error if the namespace is not registered or the engine fails.
pub async fn namespace_stats<F>(
    State(state): State<Arc<GatewayState<F>>>,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    F: StorageFrontend + 'static,
{
    let id = resource_id(path)?;
    let stats = state.frontend.nvme_namespace_stats(&id).await?;
    Ok(Json(stats))
}
