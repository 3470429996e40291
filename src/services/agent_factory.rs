//! Agent Factory (C9). Invoked on a `CREATE_AGENT` plan action.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::models::{AgentState, AgentType, MemoryEvent};
use crate::domain::ports::{IdentityManager, Memory, ToolRegistry};

/// Port for whatever agent registry the embedding process maintains.
/// Exposed to the core only as this narrow interface (spec section 4.7).
#[async_trait::async_trait]
pub trait AgentRegistry: Send + Sync {
    async fn contains(&self, agent_id: &str) -> bool;
    async fn insert(&self, state: AgentState);
}

/// In-process `AgentRegistry` used by tests and the default deployment.
#[derive(Default)]
pub struct InMemoryAgentRegistry {
    agents: tokio::sync::RwLock<std::collections::HashMap<String, AgentState>>,
}

#[async_trait::async_trait]
impl AgentRegistry for InMemoryAgentRegistry {
    async fn contains(&self, agent_id: &str) -> bool {
        self.agents.read().await.contains_key(agent_id)
    }

    async fn insert(&self, state: AgentState) {
        self.agents.write().await.insert(state.agent_id.clone(), state);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentFactoryError {
    #[error("agent_id already in use: {0}")]
    AgentIdInUse(String),
    #[error("DuplicateIdentity")]
    DuplicateIdentity,
    #[error("required tool not resolvable: {0}")]
    RequiredToolMissing(String),
}

/// Configuration carried on a `CREATE_AGENT` plan action's `config` field.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AgentCreationConfig {
    pub required_tools: Vec<String>,
}

pub struct AgentFactory {
    identity: Arc<dyn IdentityManager>,
    tools: Arc<dyn ToolRegistry>,
    memory: Arc<dyn Memory>,
    registry: Arc<dyn AgentRegistry>,
}

impl AgentFactory {
    pub fn new(
        identity: Arc<dyn IdentityManager>,
        tools: Arc<dyn ToolRegistry>,
        memory: Arc<dyn Memory>,
        registry: Arc<dyn AgentRegistry>,
    ) -> Self {
        Self { identity, tools, memory, registry }
    }

    /// Sequence exactly per spec section 4.7: validate id freshness, create
    /// identity, validate required tools, emit `agent_created`, return the
    /// new handle. On tool-validation failure, the identity is rolled back
    /// (deprecated, never deleted).
    #[instrument(skip(self, config))]
    pub async fn create_agent(
        &self,
        agent_type: AgentType,
        agent_id: &str,
        config: &AgentCreationConfig,
    ) -> Result<AgentState, AgentFactoryError> {
        if self.registry.contains(agent_id).await {
            return Err(AgentFactoryError::AgentIdInUse(agent_id.to_string()));
        }

        let public_key = self
            .identity
            .create_identity(agent_id)
            .await
            .map_err(|_| AgentFactoryError::DuplicateIdentity)?;

        let mut missing: Vec<String> = Vec::new();
        let mut resolved: HashSet<String> = HashSet::new();
        for tool_name in &config.required_tools {
            if self.tools.contains(tool_name).await {
                resolved.insert(tool_name.clone());
            } else {
                missing.push(tool_name.clone());
            }
        }
        if let Some(first_missing) = missing.into_iter().next() {
            let _ = self.identity.deprecate(agent_id).await;
            return Err(AgentFactoryError::RequiredToolMissing(first_missing));
        }

        let state = AgentState::new(agent_id, hex::encode(&public_key.0), agent_type);
        self.registry.insert(state.clone()).await;

        let event = MemoryEvent::new(
            agent_id,
            "agent_factory",
            serde_json::json!({ "event": "agent_created", "agent_type": agent_type.as_str() }),
        )
        .with_tags(vec!["agent_created".to_string()]);
        let _ = self.memory.append(event).await;

        Ok(state)
    }
}
