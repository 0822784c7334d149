//! Mapping of use case errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::ValueObjectError,
    infrastructure::dto::{conversion::PayloadError, http::ErrorResponse},
    usecase::{
        AuthenticateError, CreateRoomError, GetRoomDetailError, PublishMutationError,
        SaveFileError, SignInError, SignUpError,
    },
};

/// Error response with a JSON `{message}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {}", self.status, self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl From<PayloadError> for ApiError {
    fn from(e: PayloadError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.to_string())
    }
}

impl From<AuthenticateError> for ApiError {
    fn from(e: AuthenticateError) -> Self {
        Self::unauthorized(e.to_string())
    }
}

impl From<SignUpError> for ApiError {
    fn from(e: SignUpError) -> Self {
        let status = match &e {
            SignUpError::AlreadyExists(_) => StatusCode::CONFLICT,
            SignUpError::InvalidInput(_) | SignUpError::InvalidPassword(_) => {
                StatusCode::BAD_REQUEST
            }
            SignUpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<SignInError> for ApiError {
    fn from(e: SignInError) -> Self {
        let status = match &e {
            SignInError::NotFound(_) => StatusCode::NOT_FOUND,
            SignInError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            SignInError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SignInError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<GetRoomDetailError> for ApiError {
    fn from(e: GetRoomDetailError) -> Self {
        match e {
            GetRoomDetailError::RoomNotFound(_) => Self::not_found(e.to_string()),
        }
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(e: CreateRoomError) -> Self {
        let status = match &e {
            CreateRoomError::EmptyName | CreateRoomError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            CreateRoomError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<PublishMutationError> for ApiError {
    fn from(e: PublishMutationError) -> Self {
        match e {
            PublishMutationError::RoomNotFound(_) => Self::not_found(e.to_string()),
            PublishMutationError::BroadcastFailed(_) => Self::internal(e.to_string()),
        }
    }
}

impl From<SaveFileError> for ApiError {
    fn from(e: SaveFileError) -> Self {
        let status = match &e {
            SaveFileError::EmptyName | SaveFileError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SaveFileError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            SaveFileError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}
