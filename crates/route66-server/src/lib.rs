//! HTTP API for the Route 66 storefront.
//!
//! Routes:
//! - `GET  /healthz`
//! - `GET  /api/products` - filtered, sorted catalog
//! - `GET  /api/search?q=` - at most eight hits
//! - `GET  /api/consent` / `POST /api/consent` - consent cookies
//! - `POST /api/checkout` - checkout stub
//! - `POST /api/webhooks/orders` - signed order webhooks

mod api;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

pub use api::{build_app, ApiError, ApiResponse, ResponseMeta};
pub use state::{AppState, StateError};

/// Runtime settings for [`serve`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub catalog_path: PathBuf,
    pub transaction_log: PathBuf,
    /// Base URL the site is served from; `https` marks cookies `Secure`.
    pub public_base_url: Option<String>,
    /// HMAC secret for incoming webhooks; webhooks are refused without one.
    pub webhook_secret: Option<String>,
}

/// Load the catalog, bind and serve until ctrl-c or SIGTERM.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::load(&config)
        .with_context(|| format!("loading catalog from {}", config.catalog_path.display()))?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "route66 server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
