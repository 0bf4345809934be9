use hub::Hub;
use log::*;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use error::{Error, Result};
pub use service::AppState;

mod controller;
mod error;
mod params;
pub mod router;
mod sse;
mod ws;

/// Bind the configured interface and serve until ctrl-c.
///
/// On shutdown the hub is cancelled first so that every open event stream and
/// driver channel winds down and deregisters before the server exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let host = format!("{interface}:{}", app_state.config.port);

    let listener = TcpListener::bind(&host).await?;
    info!("Server starting... listening for connections on http://{host}");

    let hub = Arc::clone(&app_state.hub);
    axum::serve(listener, router::define_routes(app_state))
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
}

async fn shutdown_signal(hub: Arc<Hub>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received");
    hub.shutdown();
}
