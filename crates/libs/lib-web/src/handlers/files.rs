//! # File Handlers
//!
//! Blob store surface. Uploading is a two step flow: an authenticated
//! caller asks for a write-once upload URL, then posts the raw bytes to it
//! with the file's `Content-Type`. The returned `storageId` is what
//! messages reference in `fileIds`.
//!
//! Downloads are public; the handle is an unguessable UUID.

use axum::{
    body::Bytes,
    extract::{Extension, Json, Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
};
use lib_auth::Claims;
use lib_core::dto::{is_allowed_file_type, FileMetadataResponse, FileUrlResponse, UploadResponse, UploadUrlResponse};
use lib_core::model::store::FileRepository;
use lib_core::model::{FileForCreate, StoredFileMeta};
use lib_core::{AppError, Config, DbPool, Result};
use lib_utils::expires_in_minutes;
use tracing::{info, instrument};

/// `POST /api/files/upload-url`
#[instrument(skip_all, fields(user = %claims.sub))]
pub async fn create_upload_url(
    State(db): State<DbPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UploadUrlResponse>> {
    let expires_at = expires_in_minutes(config.upload_url_ttl_minutes);
    let token = FileRepository::create_upload_ticket(&db, &claims.sub, expires_at).await?;

    Ok(Json(UploadUrlResponse {
        upload_url: config.upload_url(&token),
        expires_at,
    }))
}

/// Media type of the upload, without parameters.
fn upload_content_type(headers: &HeaderMap) -> Result<String> {
    let raw = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidInput("Content-Type header is required".to_string()))?;

    let media_type = raw.split(';').next().unwrap_or_default().trim().to_lowercase();
    if !is_allowed_file_type(&media_type) {
        return Err(AppError::InvalidInput(format!("Unsupported file type: {}", media_type)));
    }

    Ok(media_type)
}

/// `POST /api/files/upload/{token}`
///
/// The body is validated before the ticket is consumed, so a rejected
/// upload can be retried with the same URL.
pub async fn upload_file(
    State(db): State<DbPool>,
    State(config): State<Config>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>> {
    let content_type = upload_content_type(&headers)?;

    if body.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if body.len() > config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds {} bytes",
            config.max_upload_bytes
        )));
    }

    let owner_id = FileRepository::consume_upload_ticket(&db, &token).await?;

    let meta = FileRepository::store(
        &db,
        FileForCreate {
            content_type,
            data: body.to_vec(),
            owner_id,
        },
    )
    .await?;

    info!("[FILE] Stored {} ({} bytes, {})", meta.id, meta.size_bytes, meta.content_type);

    Ok(Json(UploadResponse { storage_id: meta.id }))
}

/// `GET /api/files/{id}`
pub async fn download_file(State(db): State<DbPool>, Path(id): Path<String>) -> Result<impl IntoResponse> {
    let file = FileRepository::load(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", id)))?;

    Ok(([(header::CONTENT_TYPE, file.content_type)], file.data))
}

async fn find_owned_meta(db: &DbPool, id: &str, owner_id: &str) -> Result<StoredFileMeta> {
    match FileRepository::find_meta(db, id).await? {
        Some(meta) if meta.owner_id == owner_id => Ok(meta),
        _ => Err(AppError::NotFound(format!("File {} not found", id))),
    }
}

/// `GET /api/files/{id}/url`
pub async fn get_file_url(
    State(db): State<DbPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<FileUrlResponse>> {
    let meta = find_owned_meta(&db, &id, &claims.sub).await?;

    Ok(Json(FileUrlResponse {
        url: config.file_url(&meta.id),
        content_type: meta.content_type,
    }))
}

/// `GET /api/files/{id}/metadata`
pub async fn get_file_metadata(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<FileMetadataResponse>> {
    let meta = find_owned_meta(&db, &id, &claims.sub).await?;

    Ok(Json(meta.into()))
}
