//! # Data Transfer Objects (DTOs)
//!
//! Request and response bodies of the REST API.
//!
//! ## Wire Format
//!
//! DTOs use **camelCase** field names in JSON (`fileIds`, `messageId`,
//! `storageId`), matching what the chat UI sends and reads.

pub mod session;
pub mod message;
pub mod file;
pub mod catalog;

pub use session::*;
pub use message::*;
pub use file::*;
pub use catalog::*;

use serde::Serialize;

/// Standard error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
