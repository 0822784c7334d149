//! Data Transfer Objects (DTOs)
//!
//! DTOs are organized by protocol:
//! - `websocket`: messages delivered on a room topic
//! - `http`: HTTP API request and response bodies
//!
//! The client crate reuses these types, so both sides agree on the wire format.

pub mod conversion;
pub mod http;
pub mod websocket;
