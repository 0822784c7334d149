//! Shutdown signal handling.

/// Resolves when the process receives Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => tracing::error!("Failed to install Ctrl+C handler: {}", e),
    }
}
