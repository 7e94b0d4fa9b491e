//! # File Repository
//!
//! Blob store for message attachments plus the write-once upload tickets
//! that authorize a single upload.
//!
//! Files are addressed by an opaque UUID handle. A ticket is consumed
//! atomically, so two concurrent uploads with the same token cannot both
//! succeed.

use super::models::{FileForCreate, StoredFile, StoredFileMeta};
use super::DbPool;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};
use uuid::Uuid;

/// File repository for database operations.
pub struct FileRepository;

impl FileRepository {
    /// Issue a new upload ticket for `owner_id`, valid until `expires_at`.
    ///
    /// Returns the ticket token.
    pub async fn create_upload_ticket(pool: &DbPool, owner_id: &str, expires_at: DateTime<Utc>) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();

        query("INSERT INTO upload_tickets (token, owner_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(owner_id)
            .bind(expires_at)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        Ok(token)
    }

    /// Mark a ticket as used and return its owner.
    ///
    /// Unknown, expired, and already used tickets are all rejected with
    /// `InvalidInput`.
    pub async fn consume_upload_ticket(pool: &DbPool, token: &str) -> Result<String> {
        let now = Utc::now();

        let owner: Option<String> = query_scalar(
            "UPDATE upload_tickets SET used_at = ?
             WHERE token = ? AND used_at IS NULL AND expires_at > ?
             RETURNING owner_id",
        )
        .bind(now)
        .bind(token)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        owner.ok_or_else(|| AppError::InvalidInput("Upload URL is invalid, expired, or already used".to_string()))
    }

    /// Store a blob and return its metadata.
    pub async fn store(pool: &DbPool, data: FileForCreate) -> Result<StoredFileMeta> {
        let id = Uuid::new_v4().to_string();
        let size = data.data.len() as i64;

        let meta = query_as::<_, StoredFileMeta>(
            "INSERT INTO files (id, content_type, size_bytes, data, owner_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, content_type, size_bytes, owner_id, created_at",
        )
        .bind(&id)
        .bind(&data.content_type)
        .bind(size)
        .bind(&data.data)
        .bind(&data.owner_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(meta)
    }

    pub async fn find_meta(pool: &DbPool, id: &str) -> Result<Option<StoredFileMeta>> {
        let meta = query_as::<_, StoredFileMeta>(
            "SELECT id, content_type, size_bytes, owner_id, created_at FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(meta)
    }

    /// Load a blob with its bytes.
    pub async fn load(pool: &DbPool, id: &str) -> Result<Option<StoredFile>> {
        let file = query_as::<_, StoredFile>("SELECT id, content_type, data FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(file)
    }
}
