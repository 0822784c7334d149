//! Request handlers.

mod auth;
mod error;
mod http;
mod websocket;

pub use http::{
    create_room, get_room_detail, get_rooms, health_check, list_room_files, publish_mutation,
    save_file, sign_in, sign_up,
};
pub use websocket::websocket_handler;
