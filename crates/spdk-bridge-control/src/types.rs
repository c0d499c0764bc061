//! Configuration, request and response types for control plane operations.

use serde::{Deserialize, Serialize};
use spdk_bridge_core::{Listener, ResourceId};

use crate::error::{ControlError, Result};

/// Configuration for the bridge's resource handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Page size used when a list request asks for zero items.
    #[serde(default = "BridgeConfig::default_page_size")]
    pub default_page_size: usize,

    /// `host:port` NVMe/TCP controllers listen on. When unset, controllers
    /// are exposed as vfio-user PCIe functions instead.
    #[serde(default)]
    pub tcp_listen_address: Option<String>,

    /// Directory holding the vfio-user sockets of emulated PCIe functions.
    #[serde(default = "BridgeConfig::default_vfio_user_root")]
    pub vfio_user_root: String,
}

impl BridgeConfig {
    const fn default_page_size() -> usize {
        50
    }

    fn default_vfio_user_root() -> String {
        "/var/tmp/vfio-user".to_string()
    }

    /// Check the configuration before it is used on the request path.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::InvalidArgument` if the default page size is
    /// zero or the TCP listen address is not a valid `host:port`.
    pub fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(ControlError::InvalidArgument(
                "default page size must be positive".to_string(),
            ));
        }
        if let Some(addr) = &self.tcp_listen_address {
            Listener::try_tcp(addr).map_err(|e| {
                ControlError::InvalidArgument(format!("invalid TCP listen address: {e}"))
            })?;
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_page_size: Self::default_page_size(),
            tcp_listen_address: None,
            vfio_user_root: Self::default_vfio_user_root(),
        }
    }
}

/// Request to list resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    /// Parent resource, for kinds that have one.
    #[serde(default)]
    pub parent: Option<ResourceId>,
    /// Maximum items to return; zero selects the configured default.
    #[serde(default)]
    pub page_size: i32,
    /// Token from a previous response; empty starts from the beginning.
    #[serde(default)]
    pub page_token: String,
}

impl ListRequest {
    /// List children of `parent`.
    #[must_use]
    pub fn under(parent: impl Into<ResourceId>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::default()
        }
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the page token.
    #[must_use]
    pub fn with_page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = page_token.into();
        self
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Token for the next page; empty when this is the last one.
    pub next_page_token: String,
}

/// Request to delete a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Identifier of the resource.
    pub name: ResourceId,
    /// Succeed when the resource does not exist.
    #[serde(default)]
    pub allow_missing: bool,
}

impl DeleteRequest {
    /// Delete `name`, failing if it does not exist.
    #[must_use]
    pub fn new(name: impl Into<ResourceId>) -> Self {
        Self {
            name: name.into(),
            allow_missing: false,
        }
    }

    /// Delete `name`, succeeding if it does not exist.
    #[must_use]
    pub fn allow_missing(name: impl Into<ResourceId>) -> Self {
        Self {
            name: name.into(),
            allow_missing: true,
        }
    }
}
