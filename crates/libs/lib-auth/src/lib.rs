//! # Authentication Library
//!
//! Bearer token verification. Tokens are issued by the external auth provider
//! and signed with a secret shared with this service.

pub mod token;

// Re-export commonly used types
pub use token::{Claims, encode_jwt, decode_jwt};
