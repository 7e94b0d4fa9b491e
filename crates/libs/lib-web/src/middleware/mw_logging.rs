//! # Request/Response Logging Middleware
//!
//! Logs every request and its response with the request id, status, and
//! latency. Sensitive headers are redacted, and upload tokens are masked in
//! logged paths since a token is a write capability.

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sensitive headers that should not be logged
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "x-auth-token",
    "authentication",
];

/// Path prefixes whose last segment is a secret
const TOKEN_PATH_PREFIXES: &[&str] = &["/api/files/upload/"];

/// Path as it may appear in logs.
fn loggable_path(path: &str) -> String {
    for prefix in TOKEN_PATH_PREFIXES {
        if path.starts_with(prefix) && path.len() > prefix.len() {
            return format!("{}***", prefix);
        }
    }
    path.to_string()
}

pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = loggable_path(req.uri().path());
    let query = req.uri().query().map(|q| q.to_string());

    let request_id = req
        .extensions()
        .get::<crate::middleware::mw_req_stamp::RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            if SENSITIVE_HEADERS.iter().any(|h| name_lower.contains(h)) {
                Some((name.to_string(), "***REDACTED***".to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect();

    let client_ip = req
        .headers()
        .get("x-forwarded-for")
        .or_else(|| req.headers().get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        client_ip = ?client_ip,
        "[REQUEST] {} {}",
        method,
        path
    );

    debug!(request_id = %request_id, headers = ?headers, "[REQUEST HEADERS]");

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        error!(
            request_id = %request_id,
            status = status,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [SERVER ERROR]",
            method,
            path,
            status,
            duration.as_millis()
        );
    } else if response.status().is_client_error() {
        warn!(
            request_id = %request_id,
            status = status,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [CLIENT ERROR]",
            method,
            path,
            status,
            duration.as_millis()
        );
    } else {
        info!(
            request_id = %request_id,
            status = status,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms)",
            method,
            path,
            status,
            duration.as_millis()
        );
    }

    response
}
