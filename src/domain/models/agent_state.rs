//! AgentState domain model.

use serde::{Deserialize, Serialize};

/// The tier an agent occupies in the cognitive scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Orchestrator,
    Governor,
    Tactical,
    Service,
}

impl AgentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orchestrator => "orchestrator",
            Self::Governor => "governor",
            Self::Tactical => "tactical",
            Self::Service => "service",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "orchestrator" => Some(Self::Orchestrator),
            "governor" => Some(Self::Governor),
            "tactical" => Some(Self::Tactical),
            "service" => Some(Self::Service),
            _ => None,
        }
    }
}

/// Operational status of an agent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Initializing,
    Ready,
    Running,
    Degraded,
    Terminated,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Degraded => "degraded",
            Self::Terminated => "terminated",
        }
    }
}

/// A record describing a live or deprecated agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: String,
    pub public_key: String,
    pub agent_type: AgentType,
    pub status: AgentStatus,
}

impl AgentState {
    pub fn new(agent_id: impl Into<String>, public_key: impl Into<String>, agent_type: AgentType) -> Self {
        Self {
            agent_id: agent_id.into(),
            public_key: public_key.into(),
            agent_type,
            status: AgentStatus::Initializing,
        }
    }
}
