//! # AI Configuration
//!
//! Provider credentials, endpoints, and the remote-agent switch, loaded
//! from environment variables.

use lib_utils::envs::{get_env_bool, get_env_or, get_env_parse_or};
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_REMOTE_AGENT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct AiConfig {
    /// Try the remote agent before the direct providers
    pub use_remote_agent: bool,
    pub remote_agent_base_url: String,
    pub google_api_key: Option<String>,
    pub gemini_api_base: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    /// Timeout applied to every outbound AI call
    pub request_timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            use_remote_agent: false,
            remote_agent_base_url: DEFAULT_REMOTE_AGENT_BASE_URL.to_string(),
            google_api_key: None,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Result<Self, String> {
        let use_remote_agent = get_env_bool("USE_REMOTE_AGENT", false)
            .map_err(|e| format!("USE_REMOTE_AGENT must be a boolean: {}", e))?;

        let timeout_secs: u64 = get_env_parse_or("AI_REQUEST_TIMEOUT_SECS", 120)
            .map_err(|e| format!("AI_REQUEST_TIMEOUT_SECS must be a valid number: {}", e))?;

        let config = Self {
            use_remote_agent,
            remote_agent_base_url: base_url("REMOTE_AGENT_BASE_URL", DEFAULT_REMOTE_AGENT_BASE_URL),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            gemini_api_base: base_url("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: base_url("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            request_timeout: Duration::from_secs(timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("AI_REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
        }

        if self.google_api_key.is_none() {
            tracing::warn!("GOOGLE_API_KEY not set, Gemini models will fail");
        }
        if self.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, GPT models will fail");
        }

        Ok(())
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            use_remote_agent: self.use_remote_agent,
        }
    }
}

fn optional_env(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn base_url(name: &'static str, default: &str) -> String {
    get_env_or(name, default).trim_end_matches('/').to_string()
}

/// Behavior switches of the [`Orchestrator`](crate::Orchestrator), fixed at construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrchestratorConfig {
    pub use_remote_agent: bool,
}
