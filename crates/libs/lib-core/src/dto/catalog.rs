//! # Model Catalogue DTO
//!
//! `GET /api/models` -> `Vec<ModelInfo>`

use serde::{Deserialize, Serialize};

/// One selectable chat model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    /// Provider family, e.g. `gemini` or `chat_completion`
    pub provider: String,
}
