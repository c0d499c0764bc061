//! SPDK Bridge Gateway - HTTP front door for the storage frontend.
//!
//! Configuration comes from the environment; see
//! [`GatewayConfig::from_env`] for the variables read. A malformed value
//! stops startup.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spdk_bridge_control::FrontendService;
use spdk_bridge_gateway::{create_router, GatewayConfig, GatewayState};
use spdk_bridge_rpc::{RpcClient, StreamTransport};

async fn connect(config: &GatewayConfig) -> std::io::Result<RpcClient> {
    let spdk_addr = &config.spdk_addr;
    if config.engine_is_tcp() {
        tracing::info!(spdk_addr = %spdk_addr, "Connecting to engine over TCP");
        return Ok(RpcClient::new(StreamTransport::connect_tcp(spdk_addr).await?));
    }
    tracing::info!(spdk_addr = %spdk_addr, "Connecting to engine socket");
    Ok(RpcClient::new(StreamTransport::connect_unix(spdk_addr).await?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,spdk_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SPDK Bridge Gateway");

    // Load configuration from environment
    let config = GatewayConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        spdk_addr = %config.spdk_addr,
        tcp_listen_address = ?config.bridge.tcp_listen_address,
        default_page_size = config.bridge.default_page_size,
        request_timeout_seconds = config.request_timeout_seconds,
        "Gateway configuration loaded"
    );

    let rpc = connect(&config).await?;
    let frontend = Arc::new(FrontendService::with_client(rpc, config.bridge.clone())?);
    tracing::info!("Storage frontend initialized");

    let listen_addr = config.listen_addr.clone();
    let app = create_router(GatewayState::new(frontend, config));

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
