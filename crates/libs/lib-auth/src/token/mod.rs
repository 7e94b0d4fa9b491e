//! # JWT Token Verification
//!
//! Decodes and validates HS256 tokens minted by the external auth provider.
//! [`encode_jwt`] mints compatible tokens for local tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims carried by an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the auth provider's user id. Owns sessions and uploads.
    pub sub: String,
    /// Display name, when the provider includes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Encode a JWT token for `user_id`.
pub fn encode_jwt(
    user_id: &str,
    name: Option<String>,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        name,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to encode JWT: {}", e))
}

/// Decode and validate a JWT token.
///
/// Rejects expired tokens, bad signatures and tokens with an empty subject.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| format!("Failed to decode JWT: {}", e))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err("JWT subject is empty".to_string());
    }

    Ok(token_data.claims)
}
