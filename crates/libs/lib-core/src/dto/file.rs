//! # File DTOs
//!
//! Upload flow:
//! 1. `POST /api/files/upload-url` -> [`UploadUrlResponse`]
//! 2. `POST /api/files/upload/{token}` (raw body, `Content-Type` header) -> [`UploadResponse`]
//! 3. `POST /api/sessions/{id}/messages` with the `storageId` in `fileIds`

use crate::model::StoredFileMeta;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content types accepted by the blob store.
pub const ALLOWED_FILE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "application/pdf"];

pub fn is_allowed_file_type(content_type: &str) -> bool {
    ALLOWED_FILE_TYPES.contains(&content_type)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub storage_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileUrlResponse {
    pub url: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataResponse {
    pub storage_id: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<StoredFileMeta> for FileMetadataResponse {
    fn from(meta: StoredFileMeta) -> Self {
        Self {
            storage_id: meta.id,
            content_type: meta.content_type,
            size: meta.size_bytes,
            created_at: meta.created_at,
        }
    }
}
