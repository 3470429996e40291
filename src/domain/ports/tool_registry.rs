//! Tool Registry port (C5).

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::models::{AgentType, ToolDescriptor, ToolResult};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool already registered with a different version: {0}")]
    NameCollision(String),
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("caller type {caller} is not permitted to invoke tool {tool}")]
    Forbidden { tool: String, caller: String },
    #[error("missing required parameter: {0}")]
    MissingParam(String),
    #[error("parameter {name} has the wrong type, expected {expected}")]
    TypeMismatch { name: String, expected: String },
}

/// Context passed into a tool invocation: who is calling, and a
/// cancellation watch so long-running tools can cooperatively abort.
#[derive(Clone)]
pub struct InvocationContext {
    pub agent_id: String,
    pub caller_type: AgentType,
    pub cancelled: tokio::sync::watch::Receiver<bool>,
}

/// Any capability an agent plan may invoke through the registry.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn execute(&self, params: HashMap<String, serde_json::Value>, context: InvocationContext) -> ToolResult;
}

/// Port for tool registration, resolution, and invocation — the only path
/// by which an agent plan reaches external effects.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    async fn register(&self, tool: std::sync::Arc<dyn Tool>) -> Result<(), RegistryError>;

    async fn resolve(&self, name: &str, caller_type: AgentType) -> Result<std::sync::Arc<dyn Tool>, RegistryError>;

    fn validate_params(&self, tool: &dyn Tool, params: &HashMap<String, serde_json::Value>) -> Result<(), RegistryError>;

    /// Invoke a tool by name, enforcing the per-agent side-effect
    /// serialization policy from spec section 5.
    async fn invoke(
        &self,
        name: &str,
        params: HashMap<String, serde_json::Value>,
        context: InvocationContext,
    ) -> Result<ToolResult, RegistryError>;

    /// Tools currently registered whose capability set contains `tag`,
    /// used by BDI's feasibility check and AGInt's RESEARCH action.
    async fn with_capability(&self, tag: &str) -> Vec<String>;

    async fn contains(&self, name: &str) -> bool;
}
