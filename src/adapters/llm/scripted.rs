//! `ScriptedLlmHandler`: a deterministic `LlmHandler` test double, canned
//! responses keyed by call index. Grounded in the teacher's
//! `adapters/substrates/mock.rs::MockSubstrate` (sessions + per-task
//! response overrides) generalized to this crate's `complete`/`health_check`
//! surface. Not a production provider — this crate's own scenario tests
//! (S1–S6) are the only consumers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::ports::llm_handler::{CompletionError, CompletionOptions};
use crate::domain::ports::LlmHandler;

/// One scripted outcome for a single `complete` call.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Text(String),
    Unavailable(String),
}

impl ScriptedResponse {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// Replays a fixed sequence of responses in call order; the last entry
/// repeats once the sequence is exhausted so long-running loops (AGInt's
/// P-O-D-A cycles) don't panic on an empty script.
pub struct ScriptedLlmHandler {
    id: String,
    script: Mutex<Vec<ScriptedResponse>>,
    call_count: AtomicUsize,
    healthy: std::sync::atomic::AtomicBool,
}

impl ScriptedLlmHandler {
    pub fn new(id: impl Into<String>, script: Vec<ScriptedResponse>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(script),
            call_count: AtomicUsize::new(0),
            healthy: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// A handler that always returns the same plan text, for the happy path.
    pub fn constant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, vec![ScriptedResponse::text(text)])
    }

    pub fn calls_made(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl LlmHandler for ScriptedLlmHandler {
    fn handler_id(&self) -> &str {
        &self.id
    }

    async fn complete(&self, _prompt: &str, _options: CompletionOptions) -> Result<String, CompletionError> {
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().expect("scripted llm mutex poisoned");
        let response = script
            .get(index)
            .or_else(|| script.last())
            .cloned()
            .ok_or_else(|| CompletionError::Unavailable("no scripted response configured".to_string()))?;
        match response {
            ScriptedResponse::Text(text) => Ok(text),
            ScriptedResponse::Unavailable(reason) => Err(CompletionError::Unavailable(reason)),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let handler = ScriptedLlmHandler::new(
            "scripted",
            vec![ScriptedResponse::text("first"), ScriptedResponse::text("second")],
        );
        assert_eq!(handler.complete("p", CompletionOptions::default()).await.unwrap(), "first");
        assert_eq!(handler.complete("p", CompletionOptions::default()).await.unwrap(), "second");
        assert_eq!(handler.complete("p", CompletionOptions::default()).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn unavailable_entries_surface_as_errors() {
        let handler = ScriptedLlmHandler::new("scripted", vec![ScriptedResponse::Unavailable("down".into())]);
        let err = handler.complete("p", CompletionOptions::default()).await.unwrap_err();
        assert_eq!(err, CompletionError::Unavailable("down".to_string()));
    }
}
