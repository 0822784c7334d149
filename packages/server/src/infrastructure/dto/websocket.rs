//! Messages delivered on a room topic.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}`. The
//! `data` objects double as the request bodies of the publish endpoints, where
//! `userId` may be omitted because the relay stamps it from the bearer token.

use serde::{Deserialize, Serialize};

use super::http::FileDto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum TopicMessage {
    /// First frame on every subscription
    ConnectionEstablished(ConnectionEstablishedPayload),
    CodeUpdate(CodePayload),
    LanguageUpdate(LanguagePayload),
    TerminalsUpdate(TerminalsPayload),
    FileSelection(FileSelectionPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEstablishedPayload {
    pub socket_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodePayload {
    pub code: String,
    #[serde(default)]
    pub user_id: String,
    /// Unix millis
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub change_line_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePayload {
    pub language: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalsPayload {
    pub input: String,
    pub output: String,
    pub is_loading: bool,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSelectionPayload {
    pub file: FileDto,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}
