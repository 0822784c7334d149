//! Error types for the Coderoom client.

use thiserror::Error;

/// Identity and authentication failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No one is signed in on this session
    #[error("not signed in")]
    MissingIdentity,

    /// The session token is past its expiry
    #[error("session has expired, sign in again")]
    Expired,

    /// The relay did not accept the token
    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("an account with this email already exists")]
    AlreadyExists,

    #[error("no account found for this email")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Sandbox failure while running code
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// The relay answered with an error status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Input that cannot be turned into a domain value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::ConnectionError(error.to_string())
    }
}

impl From<coderoom_server::domain::ValueObjectError> for ClientError {
    fn from(error: coderoom_server::domain::ValueObjectError) -> Self {
        ClientError::InvalidInput(error.to_string())
    }
}
