//! `pi-server`: serves `GET /estimate?n=<count>`.
//!
//! Configuration: defaults, then the TOML file named by `PI_CONFIG` (if
//! set), then `PI_*` environment variables. Log level via `RUST_LOG`.
//!
//! Run with: `RUST_LOG=debug cargo run -p pi-producer --bin pi-server`

use pi_producer::{AppState, ServerConfig, serve};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match std::env::var("PI_CONFIG") {
        Ok(path) => ServerConfig::load(path)?,
        Err(_) => ServerConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        framing = %config.framing,
        pacing_ms = config.pacing_ms,
        "pi-server listening"
    );

    serve(listener, AppState::new(config), shutdown_signal()).await?;
    tracing::info!("pi-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
