use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// region: --- Session

/// Response depth requested for a session.
///
/// `deep_research` is the label the chat UI sends for [`SessionMode::Advanced`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Normal,
    #[serde(alias = "deep_research")]
    Advanced,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Normal => "normal",
            SessionMode::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(SessionMode::Normal),
            "advanced" | "deep_research" => Ok(SessionMode::Advanced),
            _ => Err(format!("Invalid session mode: {}", s)),
        }
    }
}

impl TryFrom<String> for SessionMode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A chat session. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: i64,
    pub name: String,
    pub model_id: String,
    pub mode: SessionMode,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Data structure for creating a new session.
#[derive(Debug, Clone)]
pub struct SessionForCreate {
    pub name: String,
    pub model_id: String,
    pub mode: SessionMode,
    pub owner_id: String,
}

impl SessionForCreate {
    pub fn new(name: impl Into<String>, model_id: impl Into<String>, mode: SessionMode, owner_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_id: model_id.into(),
            mode,
            owner_id: owner_id.into(),
        }
    }
}

// endregion: --- Session

// region: --- Message

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!("Invalid message role: {}", s)),
        }
    }
}

/// One turn in a session. Messages are append-only; `id` order is creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: i64,
    pub session_id: i64,
    /// Absent for assistant messages
    pub author_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    /// Opaque blob store handles attached to the message
    pub file_ids: Option<Vec<String>>,
    /// Citations; assistant messages always carry a (possibly empty) list
    pub references: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// Data structure for appending a message.
#[derive(Debug, Clone)]
pub struct MessageForCreate {
    pub session_id: i64,
    pub author_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub file_ids: Option<Vec<String>>,
    pub references: Option<Vec<String>>,
}

impl MessageForCreate {
    /// A user-authored message.
    pub fn user(session_id: i64, author_id: impl Into<String>, content: impl Into<String>, file_ids: Option<Vec<String>>) -> Self {
        Self {
            session_id,
            author_id: Some(author_id.into()),
            role: MessageRole::User,
            content: content.into(),
            file_ids: file_ids.filter(|ids| !ids.is_empty()),
            references: None,
        }
    }

    /// An assistant reply. `references` is stored even when empty.
    pub fn assistant(session_id: i64, content: impl Into<String>, references: Vec<String>) -> Self {
        Self {
            session_id,
            author_id: None,
            role: MessageRole::Assistant,
            content: content.into(),
            file_ids: None,
            references: Some(references),
        }
    }
}

// endregion: --- Message

// region: --- Files

/// Stored blob metadata (without the bytes).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct StoredFileMeta {
    pub id: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Stored blob including its bytes.
#[derive(Debug, Clone, FromRow)]
pub struct StoredFile {
    pub id: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FileForCreate {
    pub content_type: String,
    pub data: Vec<u8>,
    pub owner_id: String,
}

// endregion: --- Files
