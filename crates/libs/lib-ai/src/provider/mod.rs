//! # Model Providers
//!
//! Direct model API integrations. A model id is mapped onto the closed set
//! of [`ProviderKind`] variants by prefix, and each variant has one
//! [`ModelProvider`] implementation.

pub mod chat_completion;
pub mod gemini;

pub use chat_completion::ChatCompletionProvider;
pub use gemini::GeminiProvider;

use crate::conversation::ConversationInput;
use crate::error::AiError;
use async_trait::async_trait;
use lib_core::dto::ModelInfo;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `gemini*` models, multimodal
    Gemini,
    /// `gpt*` models over an OpenAI-compatible chat completion API
    ChatCompletion,
}

impl ProviderKind {
    pub fn from_model_id(model_id: &str) -> Result<Self, AiError> {
        if model_id.starts_with("gemini") {
            Ok(ProviderKind::Gemini)
        } else if model_id.starts_with("gpt") {
            Ok(ProviderKind::ChatCompletion)
        } else {
            Err(AiError::UnsupportedModel(model_id.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::ChatCompletion => "chat_completion",
        }
    }
}

/// A direct model API.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate the reply text for `conversation` with `model_id`.
    ///
    /// Implementations decide which parts of the conversation they send.
    async fn generate(&self, model_id: &str, conversation: &ConversationInput) -> Result<String, AiError>;
}

/// One implementation per [`ProviderKind`].
#[derive(Clone)]
pub struct ProviderSet {
    pub gemini: Arc<dyn ModelProvider>,
    pub chat_completion: Arc<dyn ModelProvider>,
}

impl ProviderSet {
    pub fn get(&self, kind: ProviderKind) -> Arc<dyn ModelProvider> {
        match kind {
            ProviderKind::Gemini => self.gemini.clone(),
            ProviderKind::ChatCompletion => self.chat_completion.clone(),
        }
    }
}

const CATALOGUE: &[(&str, &str)] = &[
    ("gemini-2.0-flash", "Gemini 2.0 Flash"),
    ("gemini-2.5-pro", "Gemini 2.5 Pro"),
    ("gpt-4o", "GPT-4o"),
    ("gpt-4o-mini", "GPT-4o-mini"),
];

/// Models offered to the chat UI.
pub fn model_catalogue() -> Vec<ModelInfo> {
    CATALOGUE
        .iter()
        .filter_map(|(id, name)| {
            let kind = ProviderKind::from_model_id(id).ok()?;
            Some(ModelInfo {
                id: id.to_string(),
                name: name.to_string(),
                provider: kind.as_str().to_string(),
            })
        })
        .collect()
}
