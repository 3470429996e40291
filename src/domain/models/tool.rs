//! Tool descriptor and invocation-result models (C5 — Tool Registry).
//!
//! Grounded in the teacher's `domain/ports/mcp_client.rs::Tool` shape
//! (name/description/input_schema) generalized with capability tags,
//! a declared parameter schema, and a caller ACL.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::models::agent_state::AgentType;

/// One parameter a tool declares in its schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub type_name: String,
    pub required: bool,
    pub description: String,
}

/// Which agent types may invoke a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerAcl {
    Any,
    Types(HashSet<AgentType>),
}

impl CallerAcl {
    pub fn allows(&self, caller: AgentType) -> bool {
        match self {
            Self::Any => true,
            Self::Types(set) => set.contains(&caller),
        }
    }
}

/// Static description of a tool, independent of any particular invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub version: String,
    pub capabilities: HashSet<String>,
    pub parameter_schema: HashMap<String, ParamSpec>,
    pub allowed_callers: CallerAcl,
    pub side_effects: bool,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            capabilities: HashSet::new(),
            parameter_schema: HashMap::new(),
            allowed_callers: CallerAcl::Any,
            side_effects: false,
        }
    }

    pub fn with_capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.insert(tag.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.parameter_schema.insert(name.into(), spec);
        self
    }

    pub fn side_effecting(mut self) -> Self {
        self.side_effects = true;
        self
    }

    pub fn callable_by(mut self, types: HashSet<AgentType>) -> Self {
        self.allowed_callers = CallerAcl::Types(types);
        self
    }
}

/// The outcome of invoking a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub ok: bool,
    pub value: serde_json::Value,
    pub error: Option<String>,
    pub artifacts: Vec<String>,
}

impl ToolResult {
    pub fn success(value: serde_json::Value) -> Self {
        Self {
            ok: true,
            value,
            error: None,
            artifacts: Vec::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: serde_json::Value::Null,
            error: Some(error.into()),
            artifacts: Vec::new(),
        }
    }
}
