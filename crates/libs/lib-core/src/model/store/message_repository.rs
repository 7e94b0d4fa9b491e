//! # Message Repository
//!
//! Append-only storage for session messages.
//!
//! Messages are never updated or deleted. The autoincrement `id` defines the
//! total order of a session's history, so every read orders by it.
//! `file_ids` and `references` are kept as JSON arrays in text columns.

use super::models::{Message, MessageForCreate, MessageRole};
use super::DbPool;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{query_as, FromRow};

const MESSAGE_COLUMNS: &str = "id, session_id, author_id, role, content, file_ids, refs, created_at";

#[derive(FromRow)]
struct MessageRow {
    id: i64,
    session_id: i64,
    author_id: Option<String>,
    role: String,
    content: String,
    file_ids: Option<String>,
    refs: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id,
            session_id: row.session_id,
            author_id: row.author_id,
            role: row.role.parse::<MessageRole>().map_err(AppError::Decoding)?,
            content: row.content,
            file_ids: decode_list(row.file_ids)?,
            references: decode_list(row.refs)?,
            created_at: row.created_at,
        })
    }
}

fn encode_list(list: &Option<Vec<String>>) -> Result<Option<String>> {
    list.as_ref()
        .map(|items| serde_json::to_string(items))
        .transpose()
        .map_err(AppError::from)
}

fn decode_list(raw: Option<String>) -> Result<Option<Vec<String>>> {
    raw.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(AppError::from)
}

/// Message repository for database operations.
pub struct MessageRepository;

impl MessageRepository {
    /// Append a message to its session and return the stored row.
    pub async fn append(pool: &DbPool, data: MessageForCreate) -> Result<Message> {
        let sql = format!(
            "INSERT INTO messages (session_id, author_id, role, content, file_ids, refs, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {MESSAGE_COLUMNS}"
        );

        let row = query_as::<_, MessageRow>(&sql)
            .bind(data.session_id)
            .bind(&data.author_id)
            .bind(data.role.as_str())
            .bind(&data.content)
            .bind(encode_list(&data.file_ids)?)
            .bind(encode_list(&data.references)?)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?;

        row.try_into()
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?");

        let row = query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(Message::try_from).transpose()
    }

    /// Full history of a session in creation order.
    pub async fn list_by_session(pool: &DbPool, session_id: i64) -> Result<Vec<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ? ORDER BY id ASC");

        let rows = query_as::<_, MessageRow>(&sql)
            .bind(session_id)
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    /// History of a session up to and including message `until_id`.
    pub async fn list_by_session_until(pool: &DbPool, session_id: i64, until_id: i64) -> Result<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ? AND id <= ? ORDER BY id ASC"
        );

        let rows = query_as::<_, MessageRow>(&sql)
            .bind(session_id)
            .bind(until_id)
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(Message::try_from).collect()
    }
}
