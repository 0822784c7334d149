//! Conversion logic between DTOs and domain entities.

use coderoom_shared::time::timestamp_to_rfc3339;
use thiserror::Error;

use crate::domain::{
    CodeChange, FileDescriptor, FileSelection, LanguageId, Mutation, MutationEvent,
    MutationKind, Room, StoredFile, TerminalsSnapshot, Timestamp, User, UserId, Username,
    ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

/// Error while turning a wire payload into a domain value
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ValueObjectError),

    #[error("'{0}' does not carry a mutation")]
    NotAMutation(&'static str),
}

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<http::FileDto> for FileDescriptor {
    type Error = ValueObjectError;

    fn try_from(dto: http::FileDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: dto.name,
            language: LanguageId::new(dto.language)?,
            content: dto.content,
        })
    }
}

impl From<dto::CodePayload> for Mutation {
    fn from(dto: dto::CodePayload) -> Self {
        Mutation::Code(CodeChange {
            code: dto.code,
            change_line_number: dto.change_line_number,
            timestamp: Timestamp::new(dto.timestamp),
        })
    }
}

impl TryFrom<dto::LanguagePayload> for Mutation {
    type Error = ValueObjectError;

    fn try_from(dto: dto::LanguagePayload) -> Result<Self, Self::Error> {
        Ok(Mutation::Language(LanguageId::new(dto.language)?))
    }
}

impl From<dto::TerminalsPayload> for Mutation {
    fn from(dto: dto::TerminalsPayload) -> Self {
        Mutation::Terminals(TerminalsSnapshot {
            input: dto.input,
            output: dto.output,
            is_loading: dto.is_loading,
        })
    }
}

impl TryFrom<dto::FileSelectionPayload> for Mutation {
    type Error = ValueObjectError;

    fn try_from(dto: dto::FileSelectionPayload) -> Result<Self, Self::Error> {
        Ok(Mutation::FileSelection(FileSelection {
            file: dto.file.try_into()?,
            opened_by: dto.username.map(Username::new).transpose()?,
        }))
    }
}

/// Parse the body of `POST /api/rooms/{room_id}/{kind}`.
///
/// Any `userId` in the body is ignored; the relay stamps the caller's identity.
pub fn mutation_from_publish_body(
    kind: MutationKind,
    body: serde_json::Value,
) -> Result<Mutation, PayloadError> {
    let mutation = match kind {
        MutationKind::Code => Mutation::from(serde_json::from_value::<dto::CodePayload>(body)?),
        MutationKind::Language => {
            Mutation::try_from(serde_json::from_value::<dto::LanguagePayload>(body)?)?
        }
        MutationKind::Terminals => {
            Mutation::from(serde_json::from_value::<dto::TerminalsPayload>(body)?)
        }
        MutationKind::FileSelection => {
            Mutation::try_from(serde_json::from_value::<dto::FileSelectionPayload>(body)?)?
        }
    };
    Ok(mutation)
}

impl TryFrom<dto::TopicMessage> for MutationEvent {
    type Error = PayloadError;

    fn try_from(message: dto::TopicMessage) -> Result<Self, Self::Error> {
        let (user_id, mutation) = match message {
            dto::TopicMessage::ConnectionEstablished(_) => {
                return Err(PayloadError::NotAMutation("connection-established"));
            }
            dto::TopicMessage::CodeUpdate(payload) => {
                (payload.user_id.clone(), Mutation::from(payload))
            }
            dto::TopicMessage::LanguageUpdate(payload) => {
                (payload.user_id.clone(), Mutation::try_from(payload)?)
            }
            dto::TopicMessage::TerminalsUpdate(payload) => {
                (payload.user_id.clone(), Mutation::from(payload))
            }
            dto::TopicMessage::FileSelection(payload) => {
                (payload.user_id.clone(), Mutation::try_from(payload)?)
            }
        };
        Ok(MutationEvent::new(UserId::new(user_id)?, mutation))
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<FileDescriptor> for http::FileDto {
    fn from(model: FileDescriptor) -> Self {
        Self {
            name: model.name,
            language: model.language.into(),
            content: model.content,
        }
    }
}

impl From<TerminalsSnapshot> for http::TerminalsDto {
    fn from(model: TerminalsSnapshot) -> Self {
        Self {
            input: model.input,
            output: model.output,
            is_loading: model.is_loading,
        }
    }
}

impl From<MutationEvent> for dto::TopicMessage {
    fn from(event: MutationEvent) -> Self {
        let user_id = event.origin.into_string();
        match event.mutation {
            Mutation::Code(change) => dto::TopicMessage::CodeUpdate(dto::CodePayload {
                code: change.code,
                user_id,
                timestamp: change.timestamp.value(),
                change_line_number: change.change_line_number,
            }),
            Mutation::Language(language) => {
                dto::TopicMessage::LanguageUpdate(dto::LanguagePayload {
                    language: language.into(),
                    user_id,
                })
            }
            Mutation::Terminals(snapshot) => {
                dto::TopicMessage::TerminalsUpdate(dto::TerminalsPayload {
                    input: snapshot.input,
                    output: snapshot.output,
                    is_loading: snapshot.is_loading,
                    user_id,
                })
            }
            Mutation::FileSelection(selection) => {
                dto::TopicMessage::FileSelection(dto::FileSelectionPayload {
                    file: selection.file.into(),
                    user_id,
                    username: selection.opened_by.map(String::from),
                })
            }
        }
    }
}

impl dto::TopicMessage {
    /// The `data` object of this message, which is also the publish request body
    pub fn payload_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            dto::TopicMessage::ConnectionEstablished(payload) => serde_json::to_value(payload),
            dto::TopicMessage::CodeUpdate(payload) => serde_json::to_value(payload),
            dto::TopicMessage::LanguageUpdate(payload) => serde_json::to_value(payload),
            dto::TopicMessage::TerminalsUpdate(payload) => serde_json::to_value(payload),
            dto::TopicMessage::FileSelection(payload) => serde_json::to_value(payload),
        }
    }
}

impl From<User> for http::UserDto {
    fn from(model: User) -> Self {
        Self {
            id: model.id.into_string(),
            username: model.username.into_string(),
            email: model.email.into(),
            rooms: model.rooms.into_iter().map(String::from).collect(),
        }
    }
}

impl From<Room> for http::RoomDetailDto {
    fn from(model: Room) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
            code: model.code,
            language: model.language.into(),
            active_file: model.active_file.map(Into::into),
            terminals: model.terminals.into(),
        }
    }
}

impl From<Room> for http::RoomSummaryDto {
    fn from(model: Room) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
            language: model.language.into(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<StoredFile> for http::SavedFileDto {
    fn from(model: StoredFile) -> Self {
        Self {
            id: model.id.into_string(),
            room_id: model.room_id.into_string(),
            name: model.name,
            language: model.language.into(),
            content: model.content,
            saved_by: model.saved_by.into_string(),
            saved_at: timestamp_to_rfc3339(model.saved_at.value()),
        }
    }
}
