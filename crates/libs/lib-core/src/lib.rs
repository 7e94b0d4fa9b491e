//! # Core Library
//!
//! Configuration, error type, domain models, persistence, and DTOs for the EcoBot backend.

pub mod config;
pub mod error;
pub mod model;
pub mod dto;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{DbPool, MIGRATOR, create_memory_pool, create_pool};
