//! # Response Mapping Middleware
//!
//! Gives error responses produced outside the handlers (unmatched routes,
//! wrong methods, rejected bodies) the same JSON shape `{error, code}` as
//! [`AppError`](lib_core::AppError) responses.

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use lib_core::dto::ErrorResponse;
use tracing::error;

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

fn error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            "InvalidInput"
        }
        StatusCode::UNAUTHORIZED => "Unauthorized",
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::METHOD_NOT_ALLOWED => "MethodNotAllowed",
        StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLarge",
        _ if status.is_server_error() => "Internal",
        _ => "Error",
    }
}

pub async fn map_res(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if status.is_server_error() {
        error!("[RESPONSE] Server error: {}", status);
    }

    if !(status.is_client_error() || status.is_server_error()) || is_json(&res) {
        return res;
    }

    let body = ErrorResponse {
        error: status.canonical_reason().unwrap_or("Request failed").to_string(),
        code: error_code(status).to_string(),
    };

    let (mut parts, _) = res.into_parts();
    parts.headers.remove(CONTENT_TYPE);
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);

    (parts, Json(body)).into_response()
}
