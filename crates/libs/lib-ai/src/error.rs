//! # Orchestration Errors
//!
//! Failure taxonomy of an orchestration run. Every variant except
//! [`AiError::ProviderHealth`] is fatal to the run and reaches the
//! dispatcher, which logs it. Nothing is written to the conversation on
//! failure.

use lib_core::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    /// Triggering message missing or not part of the session
    #[error("Not found: {0}")]
    NotFound(String),

    /// An attachment handle has no URL or content type
    #[error("File resolution failed: {0}")]
    FileResolution(String),

    /// Remote agent failed its health probe. Recovered by falling back to a direct provider.
    #[error("Remote agent unhealthy: {0}")]
    ProviderHealth(String),

    /// A model provider call failed or returned unusable output
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model id maps to no provider
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// Reading history or persisting the reply failed
    #[error("Store error: {0}")]
    Store(String),
}

impl AiError {
    /// `UnsupportedModel` is a provider failure too.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, AiError::Provider(_) | AiError::UnsupportedModel(_))
    }
}

impl From<AppError> for AiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(msg) => AiError::NotFound(msg),
            other => AiError::Store(other.to_string()),
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotFound(msg) => AppError::NotFound(msg),
            AiError::FileResolution(msg) => AppError::InvalidInput(msg),
            AiError::UnsupportedModel(model) => AppError::InvalidInput(format!("Unsupported model: {}", model)),
            AiError::ProviderHealth(msg) | AiError::Provider(msg) => AppError::Provider(msg),
            AiError::Store(msg) => AppError::Internal(msg),
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Provider(format!("HTTP error: {}", err))
    }
}
