//! LLM Handler port (C2). Interface only — no concrete provider lives in
//! the core. Modeled on the teacher's `domain/ports/llm_substrate.rs`, with
//! field names generalized to spec section 6's vocabulary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-call completion hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: Some(0.2),
            max_tokens: Some(2048),
            stop: None,
            seed: None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("llm handler unavailable: {0}")]
    Unavailable(String),
    #[error("llm handler timed out after {0}ms")]
    Timeout(u64),
    #[error("llm handler rejected the request: {0}")]
    InvalidRequest(String),
}

/// Port for async text completion. The core never constructs
/// provider-specific objects; this is the entire surface it depends on.
#[async_trait]
pub trait LlmHandler: Send + Sync {
    fn handler_id(&self) -> &str;

    async fn complete(&self, prompt: &str, options: CompletionOptions) -> Result<String, CompletionError>;

    /// Cheap liveness probe used by AGInt's Perceive phase.
    async fn health_check(&self) -> bool;
}
