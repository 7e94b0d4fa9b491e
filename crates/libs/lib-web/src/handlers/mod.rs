//! # HTTP Handlers
//!
//! | Module | Routes |
//! |---|---|
//! | [`sessions`] | `/api/sessions`, `/api/sessions/{id}` |
//! | [`messages`] | `/api/sessions/{id}/messages` |
//! | [`files`] | `/api/files/...` |
//! | [`models`] | `/api/models`, `/health` |

pub mod files;
pub mod messages;
pub mod models;
pub mod sessions;

#[cfg(test)]
mod tests;
