//! Coderoom client library.
//!
//! Keeps a local code buffer in sync with the other sessions of a room:
//! local edits go out through a per-kind debounced [`broadcaster`], remote
//! edits arrive on the [`channel`] and are applied by the [`reconcile`]
//! engine, which keeps the local cursor and scroll in place.

pub mod api;
pub mod broadcaster;
pub mod channel;
pub mod command;
pub mod config;
pub mod debounce;
pub mod domain;
pub mod editor;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod notification;
pub mod reconcile;
pub mod room_session;
pub mod runner;
pub mod session;
pub mod ui;

pub use error::{AuthError, ClientError};
pub use runner::run_client;
