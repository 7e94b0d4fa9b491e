//! Model catalogue and liveness.

use axum::Json;
use lib_core::dto::ModelInfo;

/// `GET /api/models`
pub async fn list_models() -> Json<Vec<ModelInfo>> {
    Json(lib_ai::model_catalogue())
}

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
