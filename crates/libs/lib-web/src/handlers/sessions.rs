//! # Session Handlers
//!
//! Create, list, and fetch chat sessions of the authenticated user.

use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use lib_ai::ProviderKind;
use lib_auth::Claims;
use lib_core::dto::{CreateSessionRequest, SessionResponse};
use lib_core::model::store::SessionRepository;
use lib_core::model::SessionForCreate;
use lib_core::{AppError, DbPool, Result};
use lib_utils::{validate_max_length, validate_not_empty};
use tracing::{info, instrument};

const MAX_SESSION_NAME_CHARS: usize = 200;

/// `POST /api/sessions`
///
/// Rejects model ids that no provider serves, so a session can never be
/// created with a model its messages could not be answered by.
#[instrument(skip(db, claims, req), fields(user = %claims.sub))]
pub async fn create_session(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    validate_not_empty(&req.name, "Session name").map_err(AppError::InvalidInput)?;
    validate_max_length(&req.name, MAX_SESSION_NAME_CHARS, "Session name").map_err(AppError::InvalidInput)?;
    ProviderKind::from_model_id(&req.model)?;

    let session = SessionRepository::create(
        &db,
        SessionForCreate::new(req.name.trim(), req.model, req.mode, claims.sub),
    )
    .await?;

    info!(
        session_id = session.id,
        model = %session.model_id,
        "[SESSION] Created session '{}' ({})",
        session.name,
        session.mode
    );

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// `GET /api/sessions`, newest first.
pub async fn list_sessions(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<SessionResponse>>> {
    let sessions = SessionRepository::list_by_owner(&db, &claims.sub).await?;

    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// `GET /api/sessions/{id}`
pub async fn get_session(
    State(db): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<SessionResponse>> {
    let session = SessionRepository::find_owned(&db, id, &claims.sub).await?;

    Ok(Json(session.into()))
}
