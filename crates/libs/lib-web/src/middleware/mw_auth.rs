//! # Authentication Middleware
//!
//! Validates the `Authorization: Bearer <token>` header and injects the
//! verified [`Claims`] into request extensions. Tokens are issued by the
//! external auth provider; `sub` is the user id.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/api/sessions", get(list_sessions))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! Handlers read the caller with `Extension<Claims>`:
//!
//! ```rust,ignore
//! async fn handler(Extension(claims): Extension<Claims>) -> String {
//!     format!("Hello, user {}!", claims.sub)
//! }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::{decode_jwt, Claims};
use lib_core::{AppError, Config};
use tracing::{debug, warn};

/// Reject the request with `401` unless it carries a valid bearer token.
pub async fn require_auth(State(config): State<Config>, mut req: Request, next: Next) -> Result<Response, AppError> {
    let claims = claims_from_request(&req, &config)?;

    debug!("[AUTH] Authenticated user: {}", claims.sub);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn claims_from_request(req: &Request, config: &Config) -> Result<Claims, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            AppError::Unauthorized("Missing Authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("[AUTH] Invalid Authorization header format");
        AppError::Unauthorized("Invalid Authorization header".to_string())
    })?;

    decode_jwt(token, &config.jwt_secret).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}
