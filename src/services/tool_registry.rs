//! In-process Tool Registry (C5).
//!
//! Read-mostly; registration is guarded by a single-writer lock (spec
//! section 5). Side-effecting tools are serialized per-agent via a mutex
//! keyed by `agent_id`, created lazily on first invocation.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::models::{AgentType, ToolResult};
use crate::domain::ports::tool_registry::{InvocationContext, RegistryError};
use crate::domain::ports::{Tool, ToolRegistry};

pub struct InMemoryToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
    side_effect_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for InMemoryToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            side_effect_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for_agent(&self, agent_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.side_effect_locks.lock().await;
        locks
            .entry(agent_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait::async_trait]
impl ToolRegistry for InMemoryToolRegistry {
    async fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let descriptor = tool.descriptor().clone();
        let mut tools = self.tools.write().await;
        if let Some(existing) = tools.get(&descriptor.name) {
            if existing.descriptor().version == descriptor.version {
                return Err(RegistryError::NameCollision(descriptor.name));
            }
        }
        tools.insert(descriptor.name.clone(), tool);
        Ok(())
    }

    async fn resolve(&self, name: &str, caller_type: AgentType) -> Result<Arc<dyn Tool>, RegistryError> {
        let tools = self.tools.read().await;
        let tool = tools.get(name).cloned().ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        if !tool.descriptor().allowed_callers.allows(caller_type) {
            return Err(RegistryError::Forbidden {
                tool: name.to_string(),
                caller: caller_type.as_str().to_string(),
            });
        }
        Ok(tool)
    }

    fn validate_params(&self, tool: &dyn Tool, params: &HashMap<String, serde_json::Value>) -> Result<(), RegistryError> {
        for (name, spec) in &tool.descriptor().parameter_schema {
            match params.get(name) {
                None if spec.required => return Err(RegistryError::MissingParam(name.clone())),
                None => {}
                Some(value) => {
                    if !type_matches(&spec.type_name, value) {
                        return Err(RegistryError::TypeMismatch {
                            name: name.clone(),
                            expected: spec.type_name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    async fn invoke(
        &self,
        name: &str,
        params: HashMap<String, serde_json::Value>,
        context: InvocationContext,
    ) -> Result<ToolResult, RegistryError> {
        let tool = self.resolve(name, context.caller_type).await?;
        self.validate_params(tool.as_ref(), &params)?;

        if tool.descriptor().side_effects {
            let lock = self.lock_for_agent(&context.agent_id).await;
            let _guard = lock.lock().await;
            Ok(tool.execute(params, context).await)
        } else {
            Ok(tool.execute(params, context).await)
        }
    }

    async fn with_capability(&self, tag: &str) -> Vec<String> {
        self.tools
            .read()
            .await
            .values()
            .filter(|t| t.descriptor().capabilities.contains(tag))
            .map(|t| t.descriptor().name.clone())
            .collect()
    }

    async fn contains(&self, name: &str) -> bool {
        self.tools.read().await.contains_key(name)
    }
}

fn type_matches(type_name: &str, value: &serde_json::Value) -> bool {
    match type_name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "bool" | "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}
