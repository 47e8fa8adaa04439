//! Hydra Gate Server - Main entry point
//!
//! Reference HTTP service running every route behind the authorization
//! pipeline.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hydra_gate::{
    api::{self, AppState},
    config::Config,
    pipeline::AuthorizationPipeline,
    telemetry,
};

const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = match std::env::var("HYDRA_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config: {}. Using defaults.", e);
            Config::default()
        }),
    };

    // Initialize observability
    telemetry::init("hydra-gate-server", &config.observability)?;
    let metrics_handle = telemetry::metrics::init_metrics(&config.metrics)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = config.service.name.as_deref().unwrap_or("<unset>"),
        "Starting Hydra Gate Server"
    );

    if config.service.name.is_none() {
        tracing::warn!("HYDRA__SERVICE__NAME not set; license-gated endpoints will deny");
    }

    // Build the pipeline
    let pipeline = Arc::new(
        AuthorizationPipeline::from_config(&config)
            .map_err(|e| anyhow::anyhow!("Failed to build authorization pipeline: {}", e))?,
    );
    tracing::info!(algorithm = %config.auth.jwt_algorithm, "Token validator initialized");

    spawn_revocation_purge(pipeline.clone());

    // Create app state
    let mut app_state = AppState::new(pipeline);
    if let Some(handle) = metrics_handle {
        app_state = app_state.with_metrics(handle);
    }

    // Build router
    let app = api::build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    telemetry::shutdown();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Periodically drop revocation entries whose tokens have expired.
fn spawn_revocation_purge(pipeline: Arc<AuthorizationPipeline>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(REVOCATION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = pipeline.validator().purge_revocations();
            if purged > 0 {
                tracing::debug!(purged, "Purged expired token revocations");
            }
        }
    });
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
