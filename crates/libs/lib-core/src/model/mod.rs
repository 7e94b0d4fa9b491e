//! # Model Layer
//!
//! Domain entities and their sqlx-backed repositories.

pub mod store;

pub use store::models::{
    FileForCreate, Message, MessageForCreate, MessageRole, Session, SessionForCreate, SessionMode,
    StoredFile, StoredFileMeta,
};
