//! # Response Orchestrator
//!
//! Runs one orchestration for a triggering user message:
//!
//! ```text
//! ASSEMBLE -> [remote agent: health probe -> generate] -> direct provider -> PERSIST
//! ```
//!
//! The remote agent is only tried when enabled in [`OrchestratorConfig`].
//! An unhealthy probe or a failed generation falls through to the direct
//! provider selected by the model id. Nothing is retried. The single write
//! is the assistant message appended at the end; every failure before that
//! leaves the conversation untouched.

use crate::config::OrchestratorConfig;
use crate::conversation::{ConversationAssembler, ConversationInput};
use crate::error::AiError;
use crate::provider::{ProviderKind, ProviderSet};
use crate::remote_agent::{AgentRequest, RemoteAgent};
use async_trait::async_trait;
use lib_core::model::SessionMode;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Normalized reply of any backend path.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub content: String,
    pub references: Vec<String>,
}

/// Destination of assistant replies.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Append the reply to the session and return the new message id.
    async fn save_response(&self, session_id: i64, record: &ResponseRecord) -> Result<i64, AiError>;
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    assembler: ConversationAssembler,
    remote_agent: Arc<dyn RemoteAgent>,
    providers: ProviderSet,
    sink: Arc<dyn ResponseSink>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        assembler: ConversationAssembler,
        remote_agent: Arc<dyn RemoteAgent>,
        providers: ProviderSet,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        Self {
            config,
            assembler,
            remote_agent,
            providers,
            sink,
        }
    }

    /// Produce and persist the assistant reply to `message_id`.
    ///
    /// Returns the id of the stored assistant message.
    #[instrument(skip(self), fields(model = %model_id))]
    pub async fn orchestrate(
        &self,
        session_id: i64,
        message_id: i64,
        model_id: &str,
        mode: SessionMode,
    ) -> Result<i64, AiError> {
        let conversation = self.assembler.assemble(session_id, message_id).await?;

        let remote = if self.config.use_remote_agent {
            self.try_remote_agent(session_id, model_id, mode, &conversation).await
        } else {
            None
        };

        let record = match remote {
            Some(record) => record,
            None => self.call_direct_provider(model_id, &conversation).await?,
        };

        let reply_id = self.sink.save_response(session_id, &record).await?;

        info!(
            "[ORCHESTRATOR] Saved reply {} ({} reference(s))",
            reply_id,
            record.references.len()
        );

        Ok(reply_id)
    }

    /// `None` means fall back to a direct provider.
    async fn try_remote_agent(
        &self,
        session_id: i64,
        model_id: &str,
        mode: SessionMode,
        conversation: &ConversationInput,
    ) -> Option<ResponseRecord> {
        if let Err(e) = self.remote_agent.check_health().await {
            warn!("[REMOTE AGENT] {}. Falling back to direct model call", e);
            return None;
        }

        let request = AgentRequest {
            messages: conversation.messages.clone(),
            files: conversation.attachments.clone(),
            model: model_id.to_string(),
            mode,
            session_id: session_id.to_string(),
        };

        match self.remote_agent.generate(&request).await {
            Ok(record) => {
                info!("[REMOTE AGENT] Generated reply for session {}", session_id);
                Some(record)
            }
            Err(e) => {
                warn!("[REMOTE AGENT] Generation failed: {}. Falling back to direct model call", e);
                None
            }
        }
    }

    async fn call_direct_provider(
        &self,
        model_id: &str,
        conversation: &ConversationInput,
    ) -> Result<ResponseRecord, AiError> {
        let kind = ProviderKind::from_model_id(model_id)?;
        info!("[ORCHESTRATOR] Calling {} provider", kind.as_str());

        let content = self.providers.get(kind).generate(model_id, conversation).await?;

        Ok(ResponseRecord {
            content,
            references: Vec::new(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::conversation::tests::MemoryStore;
    use crate::provider::ModelProvider;
    use lib_core::model::MessageRole;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // region: --- Fakes

    pub struct FakeProvider {
        pub reply: Result<String, String>,
        pub calls: AtomicUsize,
        pub seen: Mutex<Vec<ConversationInput>>,
        pub delay: Duration,
        pub active: AtomicUsize,
        pub max_active: AtomicUsize,
    }

    impl FakeProvider {
        pub fn with(reply: Result<String, String>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
                delay,
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            })
        }

        pub fn replying(text: &str) -> Arc<Self> {
            Self::with(Ok(text.to_string()), Duration::ZERO)
        }

        pub fn failing() -> Arc<Self> {
            Self::with(Err("boom".to_string()), Duration::ZERO)
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelProvider for FakeProvider {
        async fn generate(&self, _model_id: &str, conversation: &ConversationInput) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(conversation.clone());
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.reply.clone().map_err(AiError::Provider)
        }
    }

    pub struct FakeAgent {
        pub healthy: bool,
        pub reply: Result<ResponseRecord, String>,
        pub health_calls: AtomicUsize,
        pub generate_calls: AtomicUsize,
    }

    impl FakeAgent {
        pub fn new(healthy: bool, reply: Result<ResponseRecord, String>) -> Arc<Self> {
            Arc::new(Self {
                healthy,
                reply,
                health_calls: AtomicUsize::new(0),
                generate_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RemoteAgent for FakeAgent {
        async fn check_health(&self) -> Result<(), AiError> {
            self.health_calls.fetch_add(1, Ordering::SeqCst);
            if self.healthy {
                Ok(())
            } else {
                Err(AiError::ProviderHealth("down".into()))
            }
        }

        async fn generate(&self, _request: &AgentRequest) -> Result<ResponseRecord, AiError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(AiError::Provider)
        }
    }

    #[async_trait]
    impl ResponseSink for MemoryStore {
        async fn save_response(&self, session_id: i64, record: &ResponseRecord) -> Result<i64, AiError> {
            let id = self.push(session_id, MessageRole::Assistant, &record.content, None);
            let mut messages = self.messages.lock().unwrap();
            if let Some(msg) = messages.iter_mut().find(|m| m.id == id) {
                msg.references = Some(record.references.clone());
            }
            Ok(id)
        }
    }

    pub struct Harness {
        pub store: Arc<MemoryStore>,
        pub gemini: Arc<FakeProvider>,
        pub chat: Arc<FakeProvider>,
        pub agent: Arc<FakeAgent>,
    }

    impl Harness {
        pub fn new(store: MemoryStore, agent: Arc<FakeAgent>) -> Self {
            Self {
                store: Arc::new(store),
                gemini: FakeProvider::replying("gemini says hi"),
                chat: FakeProvider::replying("gpt says hi"),
                agent,
            }
        }

        pub fn orchestrator(&self, use_remote_agent: bool) -> Orchestrator {
            Orchestrator::new(
                OrchestratorConfig { use_remote_agent },
                ConversationAssembler::new(self.store.clone(), self.store.clone()),
                self.agent.clone(),
                ProviderSet {
                    gemini: self.gemini.clone(),
                    chat_completion: self.chat.clone(),
                },
                self.store.clone(),
            )
        }

        pub fn assistant_messages(&self) -> Vec<lib_core::model::Message> {
            self.store
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.role == MessageRole::Assistant)
                .cloned()
                .collect()
        }
    }

    fn agent_reply() -> ResponseRecord {
        ResponseRecord {
            content: "agent answer".into(),
            references: vec!["https://example.org/paper".into()],
        }
    }

    // endregion: --- Fakes

    #[tokio::test]
    async fn test_gemini_direct_reply_has_no_references() {
        let h = Harness::new(MemoryStore::default(), FakeAgent::new(true, Ok(agent_reply())));
        let msg = h.store.push(1, MessageRole::User, "What is a trophic cascade?", None);

        let reply_id = h
            .orchestrator(false)
            .orchestrate(1, msg, "gemini-2.0-flash", SessionMode::Normal)
            .await
            .unwrap();

        let replies = h.assistant_messages();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, reply_id);
        assert_eq!(replies[0].content, "gemini says hi");
        assert_eq!(replies[0].references, Some(vec![]));
        assert_eq!(h.gemini.calls(), 1);
        assert_eq!(h.chat.calls(), 0);
        assert_eq!(h.agent.health_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gpt_with_image_attachment_still_replies() {
        let store = MemoryStore::default().with_file("img", Some("http://files/img"), Some("image/jpeg"));
        let h = Harness::new(store, FakeAgent::new(true, Ok(agent_reply())));
        let msg = h.store.push(1, MessageRole::User, "What bird is this?", Some(vec!["img".into()]));

        h.orchestrator(false)
            .orchestrate(1, msg, "gpt-4o", SessionMode::Normal)
            .await
            .unwrap();

        assert_eq!(h.chat.calls(), 1);
        let seen = h.chat.seen.lock().unwrap();
        assert_eq!(seen[0].attachments.len(), 1);
        assert_eq!(h.assistant_messages()[0].content, "gpt says hi");
    }

    #[tokio::test]
    async fn test_remote_agent_success_keeps_references() {
        let h = Harness::new(MemoryStore::default(), FakeAgent::new(true, Ok(agent_reply())));
        let msg = h.store.push(1, MessageRole::User, "Deep dive on kelp forests", None);

        h.orchestrator(true)
            .orchestrate(1, msg, "gpt-4o", SessionMode::Advanced)
            .await
            .unwrap();

        let replies = h.assistant_messages();
        assert_eq!(replies[0].content, "agent answer");
        assert_eq!(replies[0].references, Some(vec!["https://example.org/paper".to_string()]));
        assert_eq!(h.chat.calls(), 0);
        assert_eq!(h.gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_unhealthy_agent_falls_back_without_generate() {
        let h = Harness::new(MemoryStore::default(), FakeAgent::new(false, Ok(agent_reply())));
        let msg = h.store.push(1, MessageRole::User, "hello", None);

        h.orchestrator(true)
            .orchestrate(1, msg, "gemini-2.0-flash", SessionMode::Normal)
            .await
            .unwrap();

        assert_eq!(h.agent.health_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.agent.generate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.gemini.calls(), 1);
        assert_eq!(h.assistant_messages()[0].references, Some(vec![]));
    }

    #[tokio::test]
    async fn test_agent_generate_failure_falls_back_once() {
        let h = Harness::new(MemoryStore::default(), FakeAgent::new(true, Err("500".into())));
        let msg = h.store.push(1, MessageRole::User, "hello", None);

        h.orchestrator(true)
            .orchestrate(1, msg, "gpt-4o-mini", SessionMode::Normal)
            .await
            .unwrap();

        assert_eq!(h.agent.generate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.chat.calls(), 1);
        assert_eq!(h.assistant_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_model_persists_nothing() {
        let h = Harness::new(MemoryStore::default(), FakeAgent::new(true, Ok(agent_reply())));
        let msg = h.store.push(1, MessageRole::User, "hello", None);

        let result = h
            .orchestrator(false)
            .orchestrate(1, msg, "llama-3", SessionMode::Normal)
            .await;

        assert!(matches!(result, Err(AiError::UnsupportedModel(_))));
        assert!(h.assistant_messages().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_persists_nothing() {
        let mut h = Harness::new(MemoryStore::default(), FakeAgent::new(true, Ok(agent_reply())));
        h.gemini = FakeProvider::failing();
        let msg = h.store.push(1, MessageRole::User, "hello", None);

        let result = h
            .orchestrator(false)
            .orchestrate(1, msg, "gemini-2.5-pro", SessionMode::Normal)
            .await;

        assert!(matches!(result, Err(AiError::Provider(_))));
        assert!(h.assistant_messages().is_empty());
    }

    #[tokio::test]
    async fn test_attachment_failure_aborts_before_any_provider_call() {
        let h = Harness::new(MemoryStore::default(), FakeAgent::new(true, Ok(agent_reply())));
        let msg = h.store.push(1, MessageRole::User, "look", Some(vec!["missing".into()]));

        let result = h
            .orchestrator(true)
            .orchestrate(1, msg, "gemini-2.0-flash", SessionMode::Normal)
            .await;

        assert!(matches!(result, Err(AiError::FileResolution(_))));
        assert_eq!(h.agent.health_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.gemini.calls(), 0);
        assert!(h.assistant_messages().is_empty());
    }
}
