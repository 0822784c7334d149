//! Relay server configuration.

use clap::Parser;
use rand::{Rng, distributions::Alphanumeric};

use crate::infrastructure::auth::jwt::DEFAULT_TOKEN_TTL_SECS;

const GENERATED_SECRET_LEN: usize = 48;

#[derive(Parser, Debug, Clone)]
#[command(name = "coderoom-server")]
#[command(about = "Room relay for collaborative code editing", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "CODEROOM_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "CODEROOM_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Secret used to sign session tokens (random per process when unset)
    #[arg(long, env = "CODEROOM_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued tokens in seconds
    #[arg(long, env = "CODEROOM_TOKEN_TTL_SECS", default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    pub token_ttl_secs: i64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl ServerConfig {
    /// The configured secret, or a freshly generated one.
    ///
    /// Tokens signed with a generated secret do not survive a restart.
    pub fn resolve_jwt_secret(&self) -> String {
        match &self.jwt_secret {
            Some(secret) if !secret.is_empty() => secret.clone(),
            _ => {
                tracing::warn!("No JWT secret configured, generating an ephemeral one");
                rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(GENERATED_SECRET_LEN)
                    .map(char::from)
                    .collect()
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            log_level: "debug".to_string(),
        }
    }
}
