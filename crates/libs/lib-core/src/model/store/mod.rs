//! # Database Store
//!
//! Database connection pool, embedded migrations, and repository implementations.

// region: --- Modules
pub mod models;
pub mod session_repository;
pub mod message_repository;
pub mod file_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use session_repository::SessionRepository;
pub use message_repository::MessageRepository;
pub use file_repository::FileRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Schema migrations from the workspace `migrations/` directory, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../../migrations");

/// Create a new SQLite connection pool for `database_url`.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Create a migrated, single-connection in-memory database.
///
/// The database lives as long as the pool. Used by tests and throwaway runs.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
// endregion: --- Types and Functions
