//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use spdk_bridge_control::StorageFrontend;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<F>
where
    F: StorageFrontend,
{
    /// The storage frontend every request is forwarded to.
    pub frontend: Arc<F>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<F> GatewayState<F>
where
    F: StorageFrontend,
{
    /// Create a new gateway state.
    #[must_use]
    pub const fn new(frontend: Arc<F>, config: GatewayConfig) -> Self {
        Self { frontend, config }
    }
}

impl<F> Clone for GatewayState<F>
where
    F: StorageFrontend,
{
    fn clone(&self) -> Self {
        Self {
            frontend: Arc::clone(&self.frontend),
            config: self.config.clone(),
        }
    }
}
