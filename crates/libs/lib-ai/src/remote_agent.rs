//! # Remote Agent Client
//!
//! HTTP client for the external agent service.
//!
//! - `GET /health` answers 2xx when the service can take requests
//! - `POST /agent/generate` takes the full conversation and returns
//!   `{content, references}`
//!
//! The agent emits references as JSON objects; they are kept as their
//! compact JSON text. Plain string references pass through unchanged.

use crate::conversation::{Attachment, ChatTurn};
use crate::error::AiError;
use crate::orchestrator::ResponseRecord;
use async_trait::async_trait;
use lib_core::model::SessionMode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub messages: Vec<ChatTurn>,
    pub files: Vec<Attachment>,
    pub model: String,
    pub mode: SessionMode,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
struct AgentResponse {
    content: String,
    #[serde(default)]
    references: Option<Vec<Value>>,
}

impl From<AgentResponse> for ResponseRecord {
    fn from(res: AgentResponse) -> Self {
        let references = res
            .references
            .unwrap_or_default()
            .into_iter()
            .map(|reference| match reference {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect();

        ResponseRecord {
            content: res.content,
            references,
        }
    }
}

#[async_trait]
pub trait RemoteAgent: Send + Sync {
    /// Probe the service. Any failure is [`AiError::ProviderHealth`].
    async fn check_health(&self) -> Result<(), AiError>;

    async fn generate(&self, request: &AgentRequest) -> Result<ResponseRecord, AiError>;
}

pub struct RemoteAgentClient {
    http: Client,
    base_url: String,
}

impl RemoteAgentClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RemoteAgent for RemoteAgentClient {
    async fn check_health(&self) -> Result<(), AiError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| AiError::ProviderHealth(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AiError::ProviderHealth(format!("Health check returned {}", response.status())))
        }
    }

    async fn generate(&self, request: &AgentRequest) -> Result<ResponseRecord, AiError> {
        let response = self
            .http
            .post(format!("{}/agent/generate", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider(format!("Remote agent returned {}: {}", status, body)));
        }

        let body: AgentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Provider(format!("Malformed remote agent response: {}", e)))?;

        Ok(body.into())
    }
}
