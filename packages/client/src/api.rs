//! HTTP client for the relay's REST API.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use coderoom_server::{
    domain::{MutationEvent, RoomId, SocketId},
    infrastructure::dto::{
        http::{
            AuthResponse, CreateRoomRequest, ErrorResponse, FilesResponse, RoomDetailDto,
            RoomDetailsResponse, RoomSummaryDto, SaveFileRequest, SaveFileResponse,
            SavedFileDto, SigninRequest, SignupRequest, SOCKET_ID_HEADER,
        },
        websocket::TopicMessage,
    },
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::{AuthError, ClientError},
    session::Identity,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the relay's HTTP origin, e.g. `http://127.0.0.1:8080`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn sign_up(&self, request: &SignupRequest) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/users/signup"))
            .json(request)
            .send()
            .await?;
        match response.status() {
            StatusCode::CONFLICT => Err(AuthError::AlreadyExists.into()),
            _ => read_json(response).await,
        }
    }

    pub async fn sign_in(&self, request: &SigninRequest) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/users/signin"))
            .json(request)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(AuthError::NotFound.into()),
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials.into()),
            _ => read_json(response).await,
        }
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummaryDto>, ClientError> {
        let response = self.http.get(self.url("/api/rooms")).send().await?;
        read_json(response).await
    }

    pub async fn create_room(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<RoomDetailDto, ClientError> {
        let response = self
            .http
            .post(self.url("/api/rooms"))
            .bearer_auth(&identity.token)
            .json(&CreateRoomRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        let body: RoomDetailsResponse = read_json(response).await?;
        Ok(body.room)
    }

    /// Latest snapshot of a room, used to hydrate a late joiner
    pub async fn room_details(
        &self,
        identity: &Identity,
        room_id: &RoomId,
    ) -> Result<RoomDetailDto, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/rooms/{}/details", room_id)))
            .bearer_auth(&identity.token)
            .send()
            .await?;
        let body: RoomDetailsResponse = read_json(response).await?;
        Ok(body.room)
    }

    pub async fn save_file(
        &self,
        identity: &Identity,
        request: &SaveFileRequest,
    ) -> Result<SavedFileDto, ClientError> {
        let response = self
            .http
            .post(self.url("/api/files"))
            .bearer_auth(&identity.token)
            .json(request)
            .send()
            .await?;
        let body: SaveFileResponse = read_json(response).await?;
        Ok(body.file)
    }

    pub async fn list_files(
        &self,
        identity: &Identity,
        room_id: &RoomId,
    ) -> Result<Vec<SavedFileDto>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/rooms/{}/files", room_id)))
            .bearer_auth(&identity.token)
            .send()
            .await?;
        let body: FilesResponse = read_json(response).await?;
        Ok(body.files)
    }

    /// `POST /api/rooms/{room_id}/{kind}`
    pub async fn publish(
        &self,
        identity: &Identity,
        room_id: &RoomId,
        event: &MutationEvent,
        socket_id: Option<&SocketId>,
    ) -> Result<(), ClientError> {
        let kind = event.kind();
        let body = TopicMessage::from(event.clone())
            .payload_json()
            .map_err(|e| ClientError::InvalidInput(e.to_string()))?;

        let mut request = self
            .http
            .post(self.url(&format!("/api/rooms/{}/{}", room_id, kind.path_segment())))
            .bearer_auth(&identity.token)
            .json(&body);
        if let Some(socket_id) = socket_id {
            request = request.header(SOCKET_ID_HEADER, socket_id.as_str());
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(response).await)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    if status == StatusCode::UNAUTHORIZED {
        return AuthError::InvalidToken(message).into();
    }
    ClientError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// Sends one mutation to the relay
#[async_trait]
pub trait RelayPublisher: Send + Sync {
    async fn publish(
        &self,
        identity: &Identity,
        room_id: &RoomId,
        event: &MutationEvent,
    ) -> Result<(), ClientError>;
}

/// [`RelayPublisher`] over HTTP. Once the channel reports its socket id, every
/// publish carries it so the relay skips the echo to this session.
#[derive(Clone)]
pub struct HttpRelayPublisher {
    api: ApiClient,
    socket_id: Arc<RwLock<Option<SocketId>>>,
}

impl HttpRelayPublisher {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            socket_id: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_socket_id(&self, socket_id: Option<SocketId>) {
        *self.socket_id.write().unwrap_or_else(|e| e.into_inner()) = socket_id;
    }
}

#[async_trait]
impl RelayPublisher for HttpRelayPublisher {
    async fn publish(
        &self,
        identity: &Identity,
        room_id: &RoomId,
        event: &MutationEvent,
    ) -> Result<(), ClientError> {
        let socket_id = self
            .socket_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        self.api
            .publish(identity, room_id, event, socket_id.as_ref())
            .await
    }
}
