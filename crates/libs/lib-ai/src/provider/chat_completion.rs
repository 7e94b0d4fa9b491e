//! # Chat Completion Provider
//!
//! OpenAI-compatible `POST {base}/chat/completions`. Sends exactly two
//! turns, the system instruction and the triggering message. History and
//! attachments are not forwarded.

use super::ModelProvider;
use crate::conversation::{ChatTurn, ConversationInput, TurnRole};
use crate::error::AiError;
use crate::prompt::SYSTEM_PROMPT;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct ChatCompletionProvider {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ChatCompletionProvider {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl ModelProvider for ChatCompletionProvider {
    async fn generate(&self, model_id: &str, conversation: &ConversationInput) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::Provider("OPENAI_API_KEY is not configured".to_string()))?;

        if !conversation.attachments.is_empty() {
            debug!(
                "🤖 {} attachment(s) not forwarded to chat completion model {}",
                conversation.attachments.len(),
                model_id
            );
        }

        let request = ChatCompletionRequest {
            model: model_id,
            messages: vec![
                ChatTurn::new(TurnRole::System, SYSTEM_PROMPT),
                ChatTurn::new(TurnRole::User, conversation.trigger.content.clone()),
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider(format!("Chat completion returned {}: {}", status, body)));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::Provider(format!("Malformed chat completion response: {}", e)))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::Provider("Empty response from chat completion".to_string()));
        }

        Ok(text)
    }
}
