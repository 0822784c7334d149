//! Room relay for Coderoom.
//!
//! Sessions publish shared-state mutations over HTTP; the relay stores the
//! latest value per kind on the room and fans the event out to every
//! WebSocket subscribed to the room's topic.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
