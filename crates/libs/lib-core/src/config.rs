//! # Application Configuration
//!
//! Service settings loaded from environment variables and validated on startup
//! to fail fast if misconfigured. The loaded [`Config`] is passed explicitly to
//! the components that need it.

use crate::error::AppError;
use lib_utils::envs::{get_env, get_env_or, get_env_parse_or};

/// Default upload cap: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret shared with the external auth provider for verifying bearer tokens
    ///
    /// **Must be at least 32 characters long**.
    pub jwt_secret: String,

    /// Externally reachable base URL of this service, used to build file URLs
    pub public_base_url: String,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,

    /// Lifetime of a write-once upload URL in minutes
    pub upload_url_ttl_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/ecobot.db");

        let jwt_secret = get_env("AUTH_JWT_SECRET")
            .map_err(|_| "AUTH_JWT_SECRET must be set in environment".to_string())?;

        let public_base_url = get_env_or("PUBLIC_BASE_URL", "http://127.0.0.1:3001")
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = get_env_parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
            .map_err(|e| format!("MAX_UPLOAD_BYTES must be a valid number: {}", e))?;

        let upload_url_ttl_minutes = get_env_parse_or("UPLOAD_URL_TTL_MINUTES", 30)
            .map_err(|e| format!("UPLOAD_URL_TTL_MINUTES must be a valid number: {}", e))?;

        Ok(Self {
            database_url,
            jwt_secret,
            public_base_url,
            max_upload_bytes,
            upload_url_ttl_minutes,
        })
    }

    /// Load from the environment and validate.
    ///
    /// Any problem is reported as [`AppError::Config`].
    pub fn load() -> crate::Result<Self> {
        Self::from_env().map_err(AppError::Config)?.validated()
    }

    /// Return `self` if [`validate`](Self::validate) passes.
    pub fn validated(self) -> crate::Result<Self> {
        self.validate().map_err(AppError::Config)?;
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("AUTH_JWT_SECRET must be at least 32 characters long".to_string());
        }

        if !(self.public_base_url.starts_with("http://") || self.public_base_url.starts_with("https://")) {
            return Err("PUBLIC_BASE_URL must start with http:// or https://".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }

        if self.upload_url_ttl_minutes < 1 || self.upload_url_ttl_minutes > 1440 {
            return Err("UPLOAD_URL_TTL_MINUTES must be between 1 and 1440".to_string());
        }

        Ok(())
    }

    /// Public URL under which a stored file can be fetched.
    pub fn file_url(&self, handle: &str) -> String {
        format!("{}/api/files/{}", self.public_base_url, handle)
    }

    /// Public write-once upload URL for an upload ticket.
    pub fn upload_url(&self, token: &str) -> String {
        format!("{}/api/files/upload/{}", self.public_base_url, token)
    }
}
