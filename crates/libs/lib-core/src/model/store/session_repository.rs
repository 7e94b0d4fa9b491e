//! # Session Repository
//!
//! Database access for chat sessions.
//!
//! Sessions are created once and never modified. Listing is scoped to an
//! owner and returned newest first.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_memory_pool, SessionRepository};
//! # use lib_core::model::{SessionForCreate, SessionMode};
//! # async fn example() -> lib_core::Result<()> {
//! let pool = create_memory_pool().await?;
//! let session = SessionRepository::create(
//!     &pool,
//!     SessionForCreate::new("Soil health", "gemini-2.0-flash", SessionMode::Normal, "user-1"),
//! ).await?;
//! let sessions = SessionRepository::list_by_owner(&pool, "user-1").await?;
//! assert_eq!(sessions[0].id, session.id);
//! # Ok(())
//! # }
//! ```

use super::models::{Session, SessionForCreate, SessionMode};
use super::DbPool;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{query_as, FromRow};

/// Raw `sessions` row; `mode` is validated on conversion.
#[derive(FromRow)]
struct SessionRow {
    id: i64,
    name: String,
    model_id: String,
    mode: String,
    owner_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self> {
        let mode = row.mode.parse::<SessionMode>().map_err(AppError::Decoding)?;
        Ok(Session {
            id: row.id,
            name: row.name,
            model_id: row.model_id,
            mode,
            owner_id: row.owner_id,
            created_at: row.created_at,
        })
    }
}

/// Session repository for database operations.
pub struct SessionRepository;

impl SessionRepository {
    /// Create a session and return it with its generated id.
    pub async fn create(pool: &DbPool, data: SessionForCreate) -> Result<Session> {
        let row = query_as::<_, SessionRow>(
            "INSERT INTO sessions (name, model_id, mode, owner_id, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, name, model_id, mode, owner_id, created_at",
        )
        .bind(&data.name)
        .bind(&data.model_id)
        .bind(data.mode.as_str())
        .bind(&data.owner_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    /// Find a session by id regardless of owner.
    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Session>> {
        let row = query_as::<_, SessionRow>(
            "SELECT id, name, model_id, mode, owner_id, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    /// Find a session visible to `owner_id`.
    ///
    /// A session owned by someone else is reported as `NotFound`, the same
    /// as a session that does not exist.
    pub async fn find_owned(pool: &DbPool, id: i64, owner_id: &str) -> Result<Session> {
        match Self::find_by_id(pool, id).await? {
            Some(session) if session.owner_id == owner_id => Ok(session),
            _ => Err(AppError::NotFound(format!("Session {} not found", id))),
        }
    }

    /// All sessions of `owner_id`, newest first.
    pub async fn list_by_owner(pool: &DbPool, owner_id: &str) -> Result<Vec<Session>> {
        let rows = query_as::<_, SessionRow>(
            "SELECT id, name, model_id, mode, owner_id, created_at
             FROM sessions WHERE owner_id = ? ORDER BY id DESC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(Session::try_from).collect()
    }
}
