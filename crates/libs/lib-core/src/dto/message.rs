//! # Message DTOs
//!
//! - `POST /api/sessions/{id}/messages` - [`SendMessageRequest`] -> [`SendMessageResponse`]
//! - `GET /api/sessions/{id}/messages` -> `Vec<MessageResponse>`

use crate::model::{Message, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Body of `POST /api/sessions/{id}/messages`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub session_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            session_id: msg.session_id,
            author_id: msg.author_id,
            role: msg.role,
            content: msg.content,
            file_ids: msg.file_ids,
            references: msg.references,
            created_at: msg.created_at,
        }
    }
}
