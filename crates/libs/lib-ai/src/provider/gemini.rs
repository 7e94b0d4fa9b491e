//! # Gemini Provider
//!
//! Multimodal generation through `models/{model}:generateContent`.
//!
//! Only the triggering message is sent, as a text part followed by every
//! image attachment inlined as base64. The text part is left out when the
//! message has no text. Other attachment types (PDF) are skipped.

use super::ModelProvider;
use crate::conversation::{Attachment, ConversationInput};
use crate::error::AiError;
use async_trait::async_trait;
use lib_utils::b64_encode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

// region: --- Wire types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// endregion: --- Wire types

pub struct GeminiProvider {
    http: Client,
    api_base: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(http: Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            api_key,
        }
    }

    async fn inline_image(&self, attachment: &Attachment) -> Result<Part, AiError> {
        let bytes = self
            .http
            .get(&attachment.url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| AiError::Provider(format!("Failed to fetch attachment {}: {}", attachment.url, e)))?
            .bytes()
            .await?;

        Ok(Part::InlineData {
            inline_data: InlineData {
                mime_type: attachment.mime_type.clone(),
                data: b64_encode(&bytes),
            },
        })
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(&self, model_id: &str, conversation: &ConversationInput) -> Result<String, AiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::Provider("GOOGLE_API_KEY is not configured".to_string()))?;

        let mut parts = Vec::with_capacity(conversation.attachments.len() + 1);
        if !conversation.trigger.content.trim().is_empty() {
            parts.push(Part::Text {
                text: conversation.trigger.content.clone(),
            });
        }
        for attachment in conversation.attachments.iter().filter(|a| a.is_image()) {
            parts.push(self.inline_image(attachment).await?);
        }
        if parts.is_empty() {
            return Err(AiError::Provider("Nothing to send to Gemini: no text and no images".to_string()));
        }

        debug!("🤖 Calling Gemini model {} with {} part(s)", model_id, parts.len());

        let url = format!("{}/models/{}:generateContent", self.api_base, model_id);
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&GenerateContentRequest {
                contents: vec![Content { role: "user", parts }],
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider(format!("Gemini returned {}: {}", status, body)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Provider(format!("Malformed Gemini response: {}", e)))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::Provider("Empty response from Gemini".to_string()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ChatTurn, TurnRole};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn conversation(attachments: Vec<Attachment>) -> ConversationInput {
        let trigger = ChatTurn::new(TurnRole::User, "What is a trophic cascade?");
        ConversationInput {
            messages: vec![trigger.clone()],
            attachments,
            trigger,
        }
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn test_text_only_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "What is a trophic cascade?" }] }]
            })))
            .respond_with(reply("Predators shape ecosystems."))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Client::new(), server.uri(), Some("test-key".into()));
        let text = provider.generate("gemini-2.0-flash", &conversation(vec![])).await.unwrap();

        assert_eq!(text, "Predators shape ecosystems.");
    }

    #[tokio::test]
    async fn test_images_are_inlined_and_pdfs_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/leaf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/report"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-pro:generateContent"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [
                    { "text": "What is a trophic cascade?" },
                    { "inline_data": { "mime_type": "image/png", "data": "AQID" } }
                ] }]
            })))
            .respond_with(reply("A leaf."))
            .expect(1)
            .mount(&server)
            .await;

        let attachments = vec![
            Attachment { url: format!("{}/files/leaf", server.uri()), mime_type: "image/png".into() },
            Attachment { url: format!("{}/files/report", server.uri()), mime_type: "application/pdf".into() },
        ];
        let provider = GeminiProvider::new(Client::new(), server.uri(), Some("k".into()));
        let text = provider.generate("gemini-2.5-pro", &conversation(attachments)).await.unwrap();

        assert_eq!(text, "A leaf.");
    }

    #[tokio::test]
    async fn test_image_only_message_sends_no_text_part() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/leaf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(reply("A leaf."))
            .expect(1)
            .mount(&server)
            .await;

        let mut input = conversation(vec![Attachment {
            url: format!("{}/files/leaf", server.uri()),
            mime_type: "image/png".into(),
        }]);
        input.trigger = ChatTurn::new(TurnRole::User, "");
        let provider = GeminiProvider::new(Client::new(), server.uri(), Some("k".into()));
        provider.generate("gemini-2.0-flash", &input).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let post = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
        let body: serde_json::Value = serde_json::from_slice(&post.body).unwrap();
        assert_eq!(
            body["contents"][0]["parts"],
            json!([{ "inline_data": { "mime_type": "image/png", "data": "AQID" } }])
        );
    }

    #[tokio::test]
    async fn test_empty_text_without_images_fails_without_calling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let mut input = conversation(vec![Attachment {
            url: format!("{}/files/report", server.uri()),
            mime_type: "application/pdf".into(),
        }]);
        input.trigger = ChatTurn::new(TurnRole::User, "  ");
        let provider = GeminiProvider::new(Client::new(), server.uri(), Some("k".into()));
        let result = provider.generate("gemini-2.0-flash", &input).await;

        assert!(matches!(result, Err(AiError::Provider(_))));
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Client::new(), server.uri(), Some("k".into()));
        let result = provider.generate("gemini-2.0-flash", &conversation(vec![])).await;

        assert!(matches!(result, Err(AiError::Provider(_))));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(Client::new(), server.uri(), Some("k".into()));
        let result = provider.generate("gemini-2.0-flash", &conversation(vec![])).await;

        assert!(matches!(result, Err(AiError::Provider(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_calling() {
        let provider = GeminiProvider::new(Client::new(), "http://127.0.0.1:9", None);
        let result = provider.generate("gemini-2.0-flash", &conversation(vec![])).await;

        assert!(matches!(result, Err(AiError::Provider(_))));
    }
}
