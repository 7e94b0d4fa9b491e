//! # Conversation Assembler
//!
//! Builds the provider-agnostic input of an orchestration run: the EcoBot
//! system turn, the session history up to the triggering message, and the
//! attachments of that message resolved to fetchable URLs.
//!
//! Assembly only reads. Attachments are resolved on every run and never
//! cached.

use crate::error::AiError;
use crate::prompt::SYSTEM_PROMPT;
use async_trait::async_trait;
use lib_core::model::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// region: --- Types

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl From<MessageRole> for TurnRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => TurnRole::User,
            MessageRole::Assistant => TurnRole::Assistant,
        }
    }
}

/// One role-tagged turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub content: String,
    pub role: TurnRole,
}

impl ChatTurn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role,
        }
    }
}

/// A resolved attachment of the triggering message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationInput {
    /// System turn followed by the history, triggering message last
    pub messages: Vec<ChatTurn>,
    /// Attachments of the triggering message, in handle order
    pub attachments: Vec<Attachment>,
    /// The triggering message on its own
    pub trigger: ChatTurn,
}

/// What a file handle resolves to. Either part may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileLocation {
    pub url: Option<String>,
    pub content_type: Option<String>,
}

// endregion: --- Types

// region: --- Ports

/// Read access to stored messages.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn message(&self, message_id: i64) -> Result<Option<Message>, AiError>;

    /// Messages of `session_id` in creation order, up to and including `message_id`.
    async fn history_until(&self, session_id: i64, message_id: i64) -> Result<Vec<Message>, AiError>;
}

/// Maps an opaque file handle to a URL and content type.
#[async_trait]
pub trait FileResolver: Send + Sync {
    async fn resolve(&self, handle: &str) -> Result<FileLocation, AiError>;
}

// endregion: --- Ports

pub struct ConversationAssembler {
    history: Arc<dyn HistoryStore>,
    files: Arc<dyn FileResolver>,
}

impl ConversationAssembler {
    pub fn new(history: Arc<dyn HistoryStore>, files: Arc<dyn FileResolver>) -> Self {
        Self { history, files }
    }

    /// Assemble the input for the run triggered by `message_id`.
    ///
    /// # Errors
    ///
    /// - [`AiError::NotFound`] if the message does not exist or belongs to another session
    /// - [`AiError::FileResolution`] if any attachment lacks a URL or content type
    pub async fn assemble(&self, session_id: i64, message_id: i64) -> Result<ConversationInput, AiError> {
        let trigger = self
            .history
            .message(message_id)
            .await?
            .filter(|msg| msg.session_id == session_id)
            .ok_or_else(|| AiError::NotFound(format!("Message {} not found in session {}", message_id, session_id)))?;

        let history = self.history.history_until(session_id, message_id).await?;

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatTurn::new(TurnRole::System, SYSTEM_PROMPT));
        messages.extend(history.into_iter().map(|msg| ChatTurn::new(msg.role.into(), msg.content)));

        let attachments = self.resolve_attachments(trigger.file_ids.as_deref().unwrap_or_default()).await?;

        Ok(ConversationInput {
            messages,
            attachments,
            trigger: ChatTurn::new(trigger.role.into(), trigger.content),
        })
    }

    async fn resolve_attachments(&self, handles: &[String]) -> Result<Vec<Attachment>, AiError> {
        let mut attachments = Vec::with_capacity(handles.len());

        for handle in handles {
            let location = self.files.resolve(handle).await?;
            match (location.url, location.content_type) {
                (Some(url), Some(mime_type)) => attachments.push(Attachment { url, mime_type }),
                _ => return Err(AiError::FileResolution(format!("File {} not found", handle))),
            }
        }

        Ok(attachments)
    }
}
