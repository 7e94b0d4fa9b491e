//! # AI Orchestration Library
//!
//! Turns a stored user message into a persisted assistant reply.
//!
//! ## Flow
//!
//! ```text
//! Dispatcher::schedule
//!   -> Orchestrator::orchestrate
//!        -> ConversationAssembler::assemble   (history + attachments)
//!        -> RemoteAgent (optional, health-gated)
//!        -> ModelProvider (Gemini | ChatCompletion)
//!        -> ResponseSink::save_response
//! ```
//!
//! Storage and file resolution are traits so the flow can run against
//! sqlite ([`store::SqlxConversationStore`]) or in-memory fakes.

pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod remote_agent;
pub mod store;

pub use config::{AiConfig, OrchestratorConfig};
pub use conversation::{Attachment, ChatTurn, ConversationAssembler, ConversationInput, TurnRole};
pub use dispatch::{DispatchJob, Dispatcher};
pub use error::AiError;
pub use orchestrator::{Orchestrator, ResponseRecord};
pub use provider::{model_catalogue, ModelProvider, ProviderKind, ProviderSet};
pub use store::{build_orchestrator, SqlxConversationStore};
