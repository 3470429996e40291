//! Shared fixtures for the end-to-end scenario tests: a resolvable echo
//! tool, a health probe paired to an outage-then-recovery LLM double, and a
//! `Mastermind` builder exposing the concrete ports underneath it so tests
//! can inspect beliefs/memory/identity directly once a campaign settles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use praxis_core::adapters::health::StaticHealthProbe;
use praxis_core::adapters::llm::ScriptedLlmHandler;
use praxis_core::adapters::memory::InMemoryMemory;
use praxis_core::domain::models::{Config, SystemHealth, ToolDescriptor, ToolResult};
use praxis_core::domain::ports::llm_handler::{CompletionError, CompletionOptions};
use praxis_core::domain::ports::tool_registry::{InvocationContext, Tool};
use praxis_core::domain::ports::{BeliefStore, LlmHandler, Memory};
use praxis_core::services::{AgentFactory, InMemoryAgentRegistry, InMemoryBeliefStore, InMemoryToolRegistry, Secp256k1IdentityManager};
use praxis_core::{CampaignView, Mastermind, MastermindError};
use uuid::Uuid;

/// A no-op echo tool, resolvable by every agent type, used across scenarios
/// that just need a plan with something to execute.
pub struct EchoTool(ToolDescriptor);

impl EchoTool {
    pub fn new() -> Self {
        Self(ToolDescriptor::new("echo", "1").with_capability("text"))
    }
}

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.0
    }

    async fn execute(&self, params: HashMap<String, serde_json::Value>, _context: InvocationContext) -> ToolResult {
        ToolResult::success(params.get("text").cloned().unwrap_or(serde_json::Value::Null))
    }
}

/// A `research`-capability tool, so AGInt's `RESEARCH` act has something to
/// invoke whenever a scenario drives a planning failure.
pub struct ResearchTool(ToolDescriptor);

impl ResearchTool {
    pub fn new() -> Self {
        Self(ToolDescriptor::new("research_note", "1").with_capability("research"))
    }
}

#[async_trait::async_trait]
impl Tool for ResearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.0
    }

    async fn execute(&self, _params: HashMap<String, serde_json::Value>, _context: InvocationContext) -> ToolResult {
        ToolResult::success(serde_json::json!({ "note": "researched" }))
    }
}

/// An `LlmHandler` whose `complete` always succeeds with a constant plan but
/// whose `health_check` reports down for its first `down_calls` probes, then
/// up forever after — scripts scenario S3 (LLM outage self-repair)
/// deterministically without relying on wall-clock timing.
pub struct DownThenUpLlm {
    id: String,
    plan: String,
    calls: AtomicU32,
    down_calls: u32,
}

impl DownThenUpLlm {
    pub fn new(plan: impl Into<String>, down_calls: u32) -> Self {
        Self { id: "down-then-up".to_string(), plan: plan.into(), calls: AtomicU32::new(0), down_calls }
    }
}

#[async_trait::async_trait]
impl LlmHandler for DownThenUpLlm {
    fn handler_id(&self) -> &str {
        &self.id
    }

    async fn complete(&self, _prompt: &str, _options: CompletionOptions) -> Result<String, CompletionError> {
        Ok(self.plan.clone())
    }

    async fn health_check(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst) >= self.down_calls
    }
}

/// A full `Mastermind` wired against in-memory adapters, with the concrete
/// ports it was built from kept alongside for direct inspection.
pub struct Fixture {
    pub mastermind: Mastermind,
    pub beliefs: Arc<dyn BeliefStore>,
    pub memory: Arc<dyn Memory>,
}

pub async fn build(llm: Arc<dyn LlmHandler>, health: Arc<dyn praxis_core::services::HealthProbe>, max_cycles: u32) -> Fixture {
    build_with_config(llm, health, Config { max_cycles, ..Config::default() }).await
}

/// Like `build`, but with every config knob available — scenarios that
/// exercise cooldown backoff want a short `cooldown_base_ms`/`cooldown_cap_ms`
/// so the test doesn't spend real wall-clock time waiting out the default
/// production backoff.
pub async fn build_with_config(llm: Arc<dyn LlmHandler>, health: Arc<dyn praxis_core::services::HealthProbe>, config: Config) -> Fixture {
    let tools = Arc::new(InMemoryToolRegistry::default());
    tools.register(Arc::new(EchoTool::new())).await.unwrap();
    tools.register(Arc::new(ResearchTool::new())).await.unwrap();
    let beliefs: Arc<dyn BeliefStore> = Arc::new(InMemoryBeliefStore::default());
    let memory: Arc<dyn Memory> = Arc::new(InMemoryMemory::new());
    let identity = Arc::new(Secp256k1IdentityManager::default());
    let registry = Arc::new(InMemoryAgentRegistry::default());
    let agent_factory = Arc::new(AgentFactory::new(identity, tools.clone(), memory.clone(), registry));

    let mastermind = Mastermind::new(llm, health, tools, beliefs.clone(), memory.clone(), agent_factory, config);
    Fixture { mastermind, beliefs, memory }
}

/// Same as `build`, but also returns the `Secp256k1IdentityManager` and
/// `InMemoryToolRegistry` handles a scenario may need to pre-seed (S6 needs
/// to register an identity before the campaign ever starts planning).
pub async fn build_with_identity(
    llm: Arc<dyn LlmHandler>,
    health: Arc<dyn praxis_core::services::HealthProbe>,
    max_cycles: u32,
) -> (Fixture, Arc<Secp256k1IdentityManager>) {
    let tools = Arc::new(InMemoryToolRegistry::default());
    tools.register(Arc::new(EchoTool::new())).await.unwrap();
    tools.register(Arc::new(ResearchTool::new())).await.unwrap();
    let beliefs: Arc<dyn BeliefStore> = Arc::new(InMemoryBeliefStore::default());
    let memory: Arc<dyn Memory> = Arc::new(InMemoryMemory::new());
    let identity = Arc::new(Secp256k1IdentityManager::default());
    let registry = Arc::new(InMemoryAgentRegistry::default());
    let agent_factory = Arc::new(AgentFactory::new(identity.clone(), tools.clone(), memory.clone(), registry));
    let config = Config { max_cycles, ..Config::default() };

    let mastermind = Mastermind::new(llm, health, tools, beliefs.clone(), memory.clone(), agent_factory, config);
    (Fixture { mastermind, beliefs, memory }, identity)
}

pub fn healthy() -> Arc<StaticHealthProbe> {
    Arc::new(StaticHealthProbe(SystemHealth::Healthy))
}

pub fn constant_llm(text: impl Into<String>) -> Arc<ScriptedLlmHandler> {
    Arc::new(ScriptedLlmHandler::constant("scenario", text))
}

/// Poll `status` until the campaign reaches a terminal state or the budget
/// of attempts runs out.
pub async fn wait_for_terminal(mastermind: &Mastermind, campaign_id: Uuid) -> Result<CampaignView, MastermindError> {
    for _ in 0..1000 {
        let view = mastermind.status(campaign_id).await?;
        if view.state.is_terminal() {
            return Ok(view);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("campaign {campaign_id} did not reach a terminal state in time");
}
