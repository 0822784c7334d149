//! Utilities shared by the relay server and the sync client.

pub mod logger;
pub mod time;
