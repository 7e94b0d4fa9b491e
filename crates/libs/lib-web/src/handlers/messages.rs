//! # Message Handlers
//!
//! Sending a message stores it and schedules one orchestration run. The
//! request returns as soon as the user message is stored; the assistant
//! reply shows up later in the message list.

use crate::server::AppState;
use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use lib_ai::DispatchJob;
use lib_auth::Claims;
use lib_core::dto::{MessageResponse, SendMessageRequest, SendMessageResponse, MAX_MESSAGE_CHARS};
use lib_core::model::store::{FileRepository, MessageRepository, SessionRepository};
use lib_core::model::MessageForCreate;
use lib_core::{AppError, DbPool, Result};
use lib_utils::validate_max_length;
use tracing::{info, instrument};

/// `POST /api/sessions/{id}/messages`
#[instrument(skip(state, claims, req), fields(user = %claims.sub))]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>)> {
    let session = SessionRepository::find_owned(&state.db, session_id, &claims.sub).await?;

    let file_ids = req.file_ids.unwrap_or_default();
    if req.content.trim().is_empty() && file_ids.is_empty() {
        return Err(AppError::InvalidInput("Message needs content or at least one file".to_string()));
    }
    validate_max_length(&req.content, MAX_MESSAGE_CHARS, "Message content").map_err(AppError::InvalidInput)?;
    check_attachments(&state.db, &file_ids, &claims.sub).await?;

    let message = MessageRepository::append(
        &state.db,
        MessageForCreate::user(session.id, claims.sub, req.content, Some(file_ids)),
    )
    .await?;

    info!(
        session_id = session.id,
        message_id = message.id,
        "[MESSAGE] Stored user message"
    );

    state.dispatcher.schedule(DispatchJob {
        session_id: session.id,
        message_id: message.id,
        model_id: session.model_id,
        mode: session.mode,
    });

    Ok((StatusCode::CREATED, Json(SendMessageResponse { message_id: message.id })))
}

/// Every attached file must exist and belong to the sender.
async fn check_attachments(db: &DbPool, file_ids: &[String], owner_id: &str) -> Result<()> {
    for id in file_ids {
        match FileRepository::find_meta(db, id).await? {
            Some(meta) if meta.owner_id == owner_id => {}
            _ => return Err(AppError::InvalidInput(format!("Unknown file: {}", id))),
        }
    }
    Ok(())
}

/// `GET /api/sessions/{id}/messages`, in creation order.
pub async fn list_messages(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<Json<Vec<MessageResponse>>> {
    let session = SessionRepository::find_owned(&db, session_id, &claims.sub).await?;
    let messages = MessageRepository::list_by_session(&db, session.id).await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
