//! UseCase 層
//!
//! ドメインモデルと Repository / MessagePusher を組み合わせて、
//! Relay が提供する操作を実装します。UI 層はこの層だけを呼び出します。

pub mod authenticate;
pub mod create_room;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod list_room_files;
pub mod publish_mutation;
pub mod save_file;
pub mod sign_in;
pub mod sign_up;
pub mod subscribe_topic;
pub mod unsubscribe_topic;

pub use authenticate::AuthenticateUseCase;
pub use create_room::CreateRoomUseCase;
pub use error::{
    AuthenticateError, CreateRoomError, GetRoomDetailError, PublishMutationError, SaveFileError,
    SignInError, SignUpError, SubscribeError,
};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use list_room_files::ListRoomFilesUseCase;
pub use publish_mutation::PublishMutationUseCase;
pub use save_file::{SaveFileCommand, SaveFileUseCase};
pub use sign_in::SignInUseCase;
pub use sign_up::SignUpUseCase;
pub use subscribe_topic::SubscribeTopicUseCase;
pub use unsubscribe_topic::UnsubscribeTopicUseCase;
