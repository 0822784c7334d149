//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    domain::{Mutation, MutationEvent, MutationKind, RoomId, SocketId},
    infrastructure::dto::{
        conversion::mutation_from_publish_body,
        http::{
            AuthResponse, CreateRoomRequest, FilesResponse, PublishResponse, RoomDetailsResponse,
            RoomSummaryDto, SOCKET_ID_HEADER, SaveFileRequest, SaveFileResponse, SigninRequest,
            SignupRequest,
        },
        websocket::TopicMessage,
    },
    ui::state::AppState,
    usecase::SaveFileCommand,
};

use super::{auth::AuthenticatedUser, error::ApiError};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, token) = state
        .sign_up_usecase
        .execute(request.username, request.email, request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token: token.token,
            expires_at: token.expires_at,
        }),
    ))
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = state
        .sign_in_usecase
        .execute(request.email, request.password)
        .await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token: token.token,
        expires_at: token.expires_at,
    }))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(Into::into).collect())
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDetailsResponse>), ApiError> {
    let room = state
        .create_room_usecase
        .execute(&user.id, request.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RoomDetailsResponse { room: room.into() }),
    ))
}

/// Latest snapshot of a room for late joiners
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailsResponse>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let room = state.get_room_detail_usecase.execute(&room_id).await?;

    Ok(Json(RoomDetailsResponse { room: room.into() }))
}

pub async fn list_room_files(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(room_id): Path<String>,
) -> Result<Json<FilesResponse>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let files = state.list_room_files_usecase.execute(&room_id).await?;

    Ok(Json(FilesResponse {
        files: files.into_iter().map(Into::into).collect(),
    }))
}

pub async fn save_file(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<SaveFileRequest>,
) -> Result<(StatusCode, Json<SaveFileResponse>), ApiError> {
    let file = state
        .save_file_usecase
        .execute(
            &user.id,
            SaveFileCommand {
                room_id: request.room_id,
                name: request.name,
                language: request.language,
                content: request.content,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveFileResponse { file: file.into() }),
    ))
}

/// `POST /api/rooms/{room_id}/{kind}`
///
/// Stores the latest value of the kind on the room and republishes the event,
/// stamped with the caller's identity, to `room-{room_id}`. Responds without
/// waiting for subscribers to receive it.
pub async fn publish_mutation(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((room_id, kind)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<PublishResponse>, ApiError> {
    let kind = MutationKind::from_path_segment(&kind)
        .ok_or_else(|| ApiError::not_found(format!("Unknown mutation kind '{}'", kind)))?;
    let room_id = RoomId::new(room_id)?;

    let mut mutation = mutation_from_publish_body(kind, body)?;
    if let Mutation::FileSelection(selection) = &mut mutation {
        selection.opened_by = Some(user.username.clone());
    }
    let event = MutationEvent::new(user.id.clone(), mutation);

    // Domain Model から DTO への変換
    let json_message = serde_json::to_string(&TopicMessage::from(event.clone()))
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let exclude = headers
        .get(SOCKET_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| SocketId::new(value).ok());

    state
        .publish_mutation_usecase
        .execute(&room_id, &event, json_message, exclude)
        .await?;

    Ok(Json(PublishResponse {
        success: true,
        message: None,
    }))
}
