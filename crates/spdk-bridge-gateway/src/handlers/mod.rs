//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod nvme;
pub mod virtio;

use axum::extract::Path;
use axum::Json;
use serde::{Deserialize, Serialize};

use spdk_bridge_control::{DeleteRequest, ListRequest};
use spdk_bridge_core::ResourceId;

use crate::error::ApiError;

/// Query parameters accepted by list routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum items to return; zero selects the default.
    #[serde(default)]
    pub page_size: i32,
    /// Token from a previous page.
    #[serde(default)]
    pub page_token: String,
}

impl ListQuery {
    /// Build a list request, optionally scoped to a parent.
    #[must_use]
    pub fn into_request(self, parent: Option<ResourceId>) -> ListRequest {
        ListRequest {
            parent,
            page_size: self.page_size,
            page_token: self.page_token,
        }
    }
}

/// Query parameters accepted by delete routes.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Succeed when the resource does not exist.
    #[serde(default)]
    pub allow_missing: bool,
}

impl DeleteQuery {
    /// Build a delete request for `name`.
    #[must_use]
    pub fn into_request(self, name: ResourceId) -> DeleteRequest {
        DeleteRequest {
            name,
            allow_missing: self.allow_missing,
        }
    }
}

/// Parse the `{id}` path segment.
pub(crate) fn resource_id(Path(id): Path<String>) -> Result<ResourceId, ApiError> {
    Ok(ResourceId::parse(&id)?)
}

/// Liveness report.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"serving"`.
    pub status: &'static str,
    /// Gateway version.
    pub version: &'static str,
}

/// `GET /health`. Does not touch the engine.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "serving",
        version: env!("CARGO_PKG_VERSION"),
    })
}
