//! # SQLite Adapters
//!
//! Implements the orchestration ports over the `lib-core` repositories and
//! wires a production [`Orchestrator`].

use crate::config::AiConfig;
use crate::conversation::{ConversationAssembler, FileLocation, FileResolver, HistoryStore};
use crate::error::AiError;
use crate::orchestrator::{Orchestrator, ResponseRecord, ResponseSink};
use crate::provider::{ChatCompletionProvider, GeminiProvider, ProviderSet};
use crate::remote_agent::RemoteAgentClient;
use async_trait::async_trait;
use lib_core::model::store::{FileRepository, MessageRepository};
use lib_core::model::{Message, MessageForCreate};
use lib_core::{Config, DbPool};
use reqwest::Client;
use std::sync::Arc;

/// Message history, file resolution, and reply persistence backed by sqlite.
#[derive(Clone)]
pub struct SqlxConversationStore {
    db: DbPool,
    config: Config,
}

impl SqlxConversationStore {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self { db, config }
    }
}

#[async_trait]
impl HistoryStore for SqlxConversationStore {
    async fn message(&self, message_id: i64) -> Result<Option<Message>, AiError> {
        Ok(MessageRepository::find_by_id(&self.db, message_id).await?)
    }

    async fn history_until(&self, session_id: i64, message_id: i64) -> Result<Vec<Message>, AiError> {
        Ok(MessageRepository::list_by_session_until(&self.db, session_id, message_id).await?)
    }
}

#[async_trait]
impl FileResolver for SqlxConversationStore {
    async fn resolve(&self, handle: &str) -> Result<FileLocation, AiError> {
        let location = match FileRepository::find_meta(&self.db, handle).await? {
            Some(meta) => FileLocation {
                url: Some(self.config.file_url(&meta.id)),
                content_type: Some(meta.content_type),
            },
            None => FileLocation::default(),
        };

        Ok(location)
    }
}

#[async_trait]
impl ResponseSink for SqlxConversationStore {
    async fn save_response(&self, session_id: i64, record: &ResponseRecord) -> Result<i64, AiError> {
        let message = MessageRepository::append(
            &self.db,
            MessageForCreate::assistant(session_id, record.content.clone(), record.references.clone()),
        )
        .await?;

        Ok(message.id)
    }
}

/// Build an orchestrator over sqlite with the HTTP providers from `ai`.
pub fn build_orchestrator(db: DbPool, config: &Config, ai: &AiConfig) -> Result<Orchestrator, AiError> {
    let http = Client::builder()
        .timeout(ai.request_timeout)
        .build()
        .map_err(|e| AiError::Provider(format!("Failed to build HTTP client: {}", e)))?;

    let store = Arc::new(SqlxConversationStore::new(db, config.clone()));

    let providers = ProviderSet {
        gemini: Arc::new(GeminiProvider::new(
            http.clone(),
            ai.gemini_api_base.clone(),
            ai.google_api_key.clone(),
        )),
        chat_completion: Arc::new(ChatCompletionProvider::new(
            http.clone(),
            ai.openai_base_url.clone(),
            ai.openai_api_key.clone(),
        )),
    };

    Ok(Orchestrator::new(
        ai.orchestrator_config(),
        ConversationAssembler::new(store.clone(), store.clone()),
        Arc::new(RemoteAgentClient::new(http, ai.remote_agent_base_url.clone())),
        providers,
        store,
    ))
}
