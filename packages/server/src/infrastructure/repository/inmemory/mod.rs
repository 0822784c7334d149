//! インメモリ Repository 実装

mod file;
mod room;
mod user;

pub use file::InMemoryFileRepository;
pub use room::InMemoryRoomRepository;
pub use user::InMemoryUserRepository;
