// hospital-cli/src/main.rs
// ============================================================================
// Module: Hospital Platform Entry Point
// Description: Loads configuration, hands it to the shared wiring, and
// serves the gateway-fronted HTTP surface until shutdown.
// Dependencies: axum, hospital-cli, hospital-config, tokio, tracing,
// tracing-subscriber
// ============================================================================

use hospital_cli::wiring;
use hospital_config::AppConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::load_from_process_env()?;
    let app = wiring::build_app(&config).await?;

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "hospital-platform listening");

    axum::serve(listener, app.router.into_make_service_with_connect_info::<std::net::SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler, shutting down without a signal wait");
    }
}
