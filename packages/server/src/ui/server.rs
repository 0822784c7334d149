//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_room, get_room_detail, get_rooms, health_check, list_room_files, publish_mutation,
        save_file, sign_in, sign_up, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Room relay server
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::in_memory(&ServerConfig::default()));
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Build the router with every endpoint mounted
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/users/signup", post(sign_up))
            .route("/api/users/signin", post(sign_in))
            .route("/api/rooms", get(get_rooms).post(create_room))
            .route("/api/rooms/{room_id}/details", get(get_room_detail))
            .route("/api/rooms/{room_id}/files", get(list_room_files))
            .route("/api/rooms/{room_id}/{kind}", post(publish_mutation))
            .route("/api/files", post(save_file))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay until Ctrl+C
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Coderoom relay listening on {}", listener.local_addr()?);
        tracing::info!("Subscribe with: ws://{}/ws?topic=room-<room_id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
