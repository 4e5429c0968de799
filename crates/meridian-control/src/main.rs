//! Meridian control service binary.
//!
//! Runs the HTTP deployment pipeline service.

use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use meridian_control::{router, AppState, ControlConfig, DeploymentManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("meridian_control=info".parse()?),
        )
        .init();

    info!("Meridian control service starting");

    let config = ControlConfig::load()?;
    info!(
        listen = %config.server.listen,
        forge_api = %config.forge.api_url,
        backends = config.generator.backends.len(),
        secret_configured = config.auth.shared_secret.is_some(),
        "configuration loaded"
    );
    if config.auth.shared_secret.is_none() {
        error!("no shared secret configured; every deployment request will be denied");
    }

    let manager = Arc::new(DeploymentManager::from_config(&config)?);
    let app = router(AppState { manager });

    let listener = tokio::net::TcpListener::bind(config.server.listen).await?;
    info!(addr = %config.server.listen, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Control service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C"),
        () = terminate => info!("Received SIGTERM"),
    }
}
