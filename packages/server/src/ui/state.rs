//! Shared application state.

use std::sync::Arc;

use coderoom_shared::time::{Clock, SystemClock};

use crate::{
    config::ServerConfig,
    domain::{FileRepository, MessagePusher, PasswordHasher, RoomRepository, TokenService, UserRepository},
    infrastructure::{
        auth::{Argon2PasswordHasher, JwtTokenService},
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryFileRepository, InMemoryRoomRepository, InMemoryUserRepository},
    },
    usecase::{
        AuthenticateUseCase, CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        ListRoomFilesUseCase, PublishMutationUseCase, SaveFileUseCase, SignInUseCase,
        SignUpUseCase, SubscribeTopicUseCase, UnsubscribeTopicUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    pub sign_up_usecase: Arc<SignUpUseCase>,
    pub sign_in_usecase: Arc<SignInUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub publish_mutation_usecase: Arc<PublishMutationUseCase>,
    pub subscribe_topic_usecase: Arc<SubscribeTopicUseCase>,
    pub unsubscribe_topic_usecase: Arc<UnsubscribeTopicUseCase>,
    pub save_file_usecase: Arc<SaveFileUseCase>,
    pub list_room_files_usecase: Arc<ListRoomFilesUseCase>,
}

impl AppState {
    /// Wire every use case against in-memory storage and the WebSocket pusher.
    pub fn in_memory(config: &ServerConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Repositories
        // 2. MessagePusher
        // 3. Auth services
        // 4. UseCases
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        // 1. Repositories (in-memory database)
        let rooms: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let files: Arc<dyn FileRepository> = Arc::new(InMemoryFileRepository::new());

        // 2. MessagePusher (WebSocket implementation)
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

        // 3. Auth services
        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
            &config.resolve_jwt_secret(),
            config.token_ttl_secs,
            clock.clone(),
        ));
        let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());

        // 4. UseCases
        Self {
            authenticate_usecase: Arc::new(AuthenticateUseCase::new(
                token_service.clone(),
                users.clone(),
            )),
            sign_up_usecase: Arc::new(SignUpUseCase::new(
                users.clone(),
                password_hasher.clone(),
                token_service.clone(),
                clock.clone(),
            )),
            sign_in_usecase: Arc::new(SignInUseCase::new(
                users.clone(),
                password_hasher,
                token_service,
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                rooms.clone(),
                users,
                clock.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(rooms.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(rooms.clone())),
            publish_mutation_usecase: Arc::new(PublishMutationUseCase::new(
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            subscribe_topic_usecase: Arc::new(SubscribeTopicUseCase::new(
                rooms.clone(),
                message_pusher.clone(),
            )),
            unsubscribe_topic_usecase: Arc::new(UnsubscribeTopicUseCase::new(message_pusher)),
            save_file_usecase: Arc::new(SaveFileUseCase::new(
                rooms.clone(),
                files.clone(),
                clock,
            )),
            list_room_files_usecase: Arc::new(ListRoomFilesUseCase::new(rooms, files)),
        }
    }
}
