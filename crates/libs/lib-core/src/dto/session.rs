//! # Session DTOs
//!
//! - `POST /api/sessions` - [`CreateSessionRequest`] -> [`SessionResponse`]
//! - `GET /api/sessions` -> `Vec<SessionResponse>`
//! - `GET /api/sessions/{id}` -> [`SessionResponse`]

use crate::model::{Session, SessionMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/sessions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    /// Model id, e.g. `gemini-2.0-flash`
    pub model: String,
    #[serde(default)]
    pub mode: SessionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: i64,
    pub name: String,
    pub model: String,
    pub mode: SessionMode,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            name: session.name,
            model: session.model_id,
            mode: session.mode,
            created_at: session.created_at,
        }
    }
}
