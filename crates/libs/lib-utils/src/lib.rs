//! # Utilities Library
//!
//! Shared helpers for environment variables, base64 payloads, timestamps, and input validation.

pub mod b64;
pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use b64::b64_encode;
pub use envs::{get_env, get_env_bool, get_env_or, get_env_parse_or};
pub use time::{expires_in_minutes, now_utc};
pub use validation::{validate_max_length, validate_not_empty};
