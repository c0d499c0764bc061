//! Gateway configuration types.
//!
//! This module defines configuration structures for the HTTP gateway and
//! loads them from the environment.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use spdk_bridge_control::{BridgeConfig, ControlError};
use spdk_bridge_rpc::DEFAULT_SOCKET_PATH;

/// Errors raised while loading the gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse.
    #[error("{var}: invalid value {value:?}: {reason}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },

    /// The bridge settings do not validate.
    #[error(transparent)]
    Bridge(#[from] ControlError),
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Engine RPC endpoint: a Unix socket path or a `host:port`.
    #[serde(default = "GatewayConfig::default_spdk_addr")]
    pub spdk_addr: String,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// How long a client waits for a response, in seconds. An engine call
    /// already sent still runs to completion after the client gives up.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Resource handling settings passed to the frontend.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_spdk_addr() -> String {
        DEFAULT_SOCKET_PATH.to_string()
    }

    const fn default_max_body() -> usize {
        64 * 1024 // 64 KiB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Whether the engine is reached over TCP rather than a Unix socket.
    ///
    /// A `host:port` has a colon and no slash; anything else is a path.
    #[must_use]
    pub fn engine_is_tcp(&self) -> bool {
        self.spdk_addr.contains(':') && !self.spdk_addr.contains('/')
    }

    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `LISTEN_ADDR`: HTTP listen address
    /// - `SPDK_ADDR`: engine RPC endpoint
    /// - `REQUEST_TIMEOUT_SECONDS`: client-facing request timeout
    /// - `NVME_TCP_LISTEN_ADDR`: when set, NVMe controllers listen here over
    ///   TCP instead of being exposed as vfio-user PCIe functions
    /// - `VFIO_USER_ROOT`: directory for vfio-user sockets
    /// - `DEFAULT_PAGE_SIZE`: page size for list requests that ask for zero
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse or the
    /// bridge settings do not validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(val) = lookup("LISTEN_ADDR") {
            config.listen_addr = val;
        }
        if let Some(val) = lookup("SPDK_ADDR") {
            config.spdk_addr = val;
        }
        if let Some(val) = lookup("REQUEST_TIMEOUT_SECONDS") {
            config.request_timeout_seconds = parse_var("REQUEST_TIMEOUT_SECONDS", val)?;
        }
        if let Some(val) = lookup("NVME_TCP_LISTEN_ADDR") {
            config.bridge.tcp_listen_address = Some(val);
        }
        if let Some(val) = lookup("VFIO_USER_ROOT") {
            config.bridge.vfio_user_root = val;
        }
        if let Some(val) = lookup("DEFAULT_PAGE_SIZE") {
            config.bridge.default_page_size = parse_var("DEFAULT_PAGE_SIZE", val)?;
        }

        config.bridge.validate()?;
        Ok(config)
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::InvalidValue {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            spdk_addr: Self::default_spdk_addr(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            bridge: BridgeConfig::default(),
        }
    }
}
