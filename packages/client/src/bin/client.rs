//! Coderoom CLI client.
//!
//! Signs in (or up), joins or creates a room and edits its shared buffer from
//! a line-oriented prompt. Reconnects after a lost connection (max 5 attempts
//! with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin coderoom-client -- -e a@x.com -P p1 -u alice -n pairing
//! cargo run --bin coderoom-client -- -e b@x.com -P p2 -u bob -r <room id>
//! ```

use clap::Parser;
use coderoom_client::config::ClientConfig;
use coderoom_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = ClientConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if let Err(e) = coderoom_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
