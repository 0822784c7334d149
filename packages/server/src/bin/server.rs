//! Coderoom relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin coderoom-server
//! cargo run --bin coderoom-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use coderoom_server::{
    config::ServerConfig,
    ui::{AppState, Server},
};
use coderoom_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    let state = Arc::new(AppState::in_memory(&config));
    let server = Server::new(state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
