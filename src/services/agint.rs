//! AGInt Cognitive Governor (C7) — Perceive-Orient-Decide-Act control loop.
//!
//! Grounded in the teacher's `services/overmind.rs` (strategic-decision
//! service wrapping a substrate call with timeout/retry/concurrency limits)
//! generalized to the P-O-D-A rule table fixed in spec section 4.5. The
//! upward callback is the teacher's narrow-interface redesign from spec
//! section 9 ("Cyclic references between BDI and Mastermind"): AGInt never
//! holds a reference back to its owner, only an `on_progress` callback
//! supplied at construction.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{instrument, warn};

use crate::domain::models::{
    select_model, AgentType, BeliefSource, Decision, Goal, GoalStatus, LastActionOutcome, LlmHealth, ModelCandidate,
    ModelSelectionWeights, SituationalSummary, SystemHealth,
};
use crate::domain::ports::tool_registry::InvocationContext;
use crate::domain::ports::{BeliefStore, LlmHandler, ToolRegistry};
use crate::services::bdi::{BdiOutcome, BdiReasoner};

/// Probe for host-process health, sampled by Perceive. Mirrors the
/// `HealthProbe` seam the `ScriptedHealthProbe`/`StaticHealthProbe` test
/// doubles in `adapters::health` implement.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn system_health(&self) -> SystemHealth;
}

/// What Act actually did this tick, reported upward via `on_progress`.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub decision: Decision,
    pub outcome: LastActionOutcome,
    pub detail: String,
}

/// The narrow upward-callback interface: AGInt reports what happened on
/// every tick; it never calls back into the Mastermind directly.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn on_progress(&self, report: TickReport);
}

/// The terminal outcome of a full `run_campaign` loop.
#[derive(Debug, Clone)]
pub struct AgintOutcome {
    pub status: GoalStatus,
    pub reason: String,
    pub cycles_run: u32,
}

/// Cooldown backoff state: doubles on each consecutive `COOLDOWN` decision,
/// capped at `cooldown_cap_ms`, resets to `cooldown_base_ms` on any other
/// decision (spec section 4.5's "Act" row for `COOLDOWN`).
struct Backoff {
    base_ms: u64,
    cap_ms: u64,
    current_ms: AtomicU32,
}

impl Backoff {
    fn new(base_ms: u64, cap_ms: u64) -> Self {
        Self { base_ms, cap_ms, current_ms: AtomicU32::new(base_ms.min(u32::MAX as u64) as u32) }
    }

    /// Returns the sleep duration for this cooldown tick and advances state.
    fn next(&self) -> Duration {
        let current = self.current_ms.load(Ordering::SeqCst) as u64;
        let next = (current.saturating_mul(2)).min(self.cap_ms).max(self.base_ms);
        self.current_ms.store(next.min(u32::MAX as u64) as u32, Ordering::SeqCst);
        Duration::from_millis(current)
    }

    fn reset(&self) {
        self.current_ms.store(self.base_ms.min(u32::MAX as u64) as u32, Ordering::SeqCst);
    }
}

/// AGInt's own per-campaign state machine. One instance is constructed per
/// delegated campaign goal; it owns exactly one `BdiReasoner` instance,
/// reused across `DELEGATE` decisions (spec section 2's "on `DELEGATE`
/// spawns/reuses C6 with a goal").
pub struct AgintGovernor {
    llm: Arc<dyn LlmHandler>,
    health: Arc<dyn HealthProbe>,
    bdi: Arc<BdiReasoner>,
    tools: Arc<dyn ToolRegistry>,
    beliefs: Arc<dyn BeliefStore>,
    sink: Arc<dyn ProgressSink>,
    agent_id: String,
    model_weights: ModelSelectionWeights,
    model_candidates: Vec<ModelCandidate>,
    cycle_timeout: Duration,
    backoff: Backoff,
    consecutive_self_repairs: AtomicU32,
}

impl AgintGovernor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Arc<dyn LlmHandler>,
        health: Arc<dyn HealthProbe>,
        bdi: Arc<BdiReasoner>,
        tools: Arc<dyn ToolRegistry>,
        beliefs: Arc<dyn BeliefStore>,
        sink: Arc<dyn ProgressSink>,
        agent_id: impl Into<String>,
        model_weights: ModelSelectionWeights,
        model_candidates: Vec<ModelCandidate>,
        cycle_timeout: Duration,
        cooldown_base_ms: u64,
        cooldown_cap_ms: u64,
    ) -> Self {
        Self {
            llm,
            health,
            bdi,
            tools,
            beliefs,
            sink,
            agent_id: agent_id.into(),
            model_weights,
            model_candidates,
            cycle_timeout,
            backoff: Backoff::new(cooldown_base_ms, cooldown_cap_ms),
            consecutive_self_repairs: AtomicU32::new(0),
        }
    }

    /// Drive the campaign goal through P-O-D-A ticks until it reaches a
    /// terminal status, `UNRECOVERABLE` is reached, or `cancel` fires.
    /// `max_cycles` bounds total ticks, matching `submit`'s `max_cycles`
    /// option (spec section 6).
    #[instrument(skip(self, goal, cancel), fields(goal_id = %goal.id))]
    pub async fn run_campaign(&self, goal: &mut Goal, max_cycles: u32, cancel: &mut watch::Receiver<bool>) -> AgintOutcome {
        let mut last_outcome = LastActionOutcome::None;

        for tick in 0..max_cycles {
            // Cancellation is checked at the end of Perceive in every tick
            // (spec section 5).
            let system_health = self.perceive().await;
            if *cancel.borrow() {
                return AgintOutcome { status: GoalStatus::Abandoned, reason: "cancelled".to_string(), cycles_run: tick };
            }

            let llm_health = self.probe_llm_health().await;
            let summary = self.orient(system_health, llm_health, last_outcome);
            let decision = crate::domain::models::decide(&summary);

            // Three consecutive SELF_REPAIR cycles that already failed to
            // recover the dependency means this tick's attempt is doomed
            // too (spec section 4.5): short-circuit to UNRECOVERABLE rather
            // than spend a fourth attempt.
            if decision == Decision::SelfRepair && self.consecutive_self_repairs.load(Ordering::SeqCst) >= 3 {
                return AgintOutcome {
                    status: GoalStatus::Failed,
                    reason: "max_self_repair_exceeded".to_string(),
                    cycles_run: tick,
                };
            }

            let tick_result = timeout(self.cycle_timeout, self.act(decision, llm_health, goal, cancel)).await;
            let (outcome, detail, terminal) = match tick_result {
                Err(_elapsed) => (LastActionOutcome::Failure, "tick_timeout".to_string(), None),
                Ok(result) => result,
            };

            self.sink.on_progress(TickReport { decision, outcome, detail: detail.clone() }).await;
            // The Decide table's `last_action` column reflects the outcome
            // of the last *delegated* action specifically (spec section
            // 4.5's rule table distinguishes only DELEGATE's own
            // success/failure/none) — a failed SELF_REPAIR or RESEARCH tick
            // does not itself route the next tick to RESEARCH.
            if decision == Decision::Delegate {
                last_outcome = outcome;
            }

            if let Some(status) = terminal {
                return AgintOutcome { status, reason: detail, cycles_run: tick + 1 };
            }

            if decision == Decision::SelfRepair && outcome == LastActionOutcome::Failure {
                self.consecutive_self_repairs.fetch_add(1, Ordering::SeqCst);
            } else {
                self.consecutive_self_repairs.store(0, Ordering::SeqCst);
            }

            if decision == Decision::Cooldown {
                tokio::time::sleep(self.backoff.next()).await;
            } else {
                self.backoff.reset();
            }
        }

        AgintOutcome { status: GoalStatus::Failed, reason: "max_cycles_exhausted".to_string(), cycles_run: max_cycles }
    }

    /// Perceive: sample system health. (The LLM liveness probe is kept
    /// separate in `probe_llm_health` so a slow/erroring probe never blocks
    /// the health sample it's paired with.)
    async fn perceive(&self) -> SystemHealth {
        self.health.system_health().await
    }

    async fn probe_llm_health(&self) -> LlmHealth {
        if self.llm.health_check().await {
            LlmHealth::Operational
        } else {
            LlmHealth::Down
        }
    }

    fn orient(&self, system_health: SystemHealth, llm_health: LlmHealth, last_action_outcome: LastActionOutcome) -> SituationalSummary {
        SituationalSummary { system_health, llm_health, last_action_outcome, campaign_progress: String::new() }
    }

    /// Act: dispatch on the chosen decision. Returns `(outcome, detail,
    /// Some(terminal_status))` when the campaign goal reaches a terminal
    /// state this tick, `None` otherwise.
    async fn act(
        &self,
        decision: Decision,
        llm_health: LlmHealth,
        goal: &mut Goal,
        cancel: &mut watch::Receiver<bool>,
    ) -> (LastActionOutcome, String, Option<GoalStatus>) {
        match decision {
            Decision::Cooldown => (LastActionOutcome::None, "cooldown".to_string(), None),
            Decision::SelfRepair => self.self_repair(llm_health),
            Decision::Research => self.research().await,
            Decision::Delegate => self.delegate(goal, cancel).await,
        }
    }

    /// Attempt to restore a failed dependency. A real deployment would
    /// invoke the LLM handler's provider-switch hook and clear tool-registry
    /// caches here; this crate's scope owns the attempt-and-report half of
    /// spec section 4.5 — whether the dependency actually recovered is
    /// observed by the *next* tick's own Perceive probe, not re-probed here,
    /// so a single tick's repair attempt consumes exactly the Perceive probe
    /// already taken this tick (no hidden extra calls into the LLM handler).
    fn self_repair(&self, llm_health: LlmHealth) -> (LastActionOutcome, String, Option<GoalStatus>) {
        if llm_health == LlmHealth::Operational {
            (LastActionOutcome::Success, "self_repair_recovered".to_string(), None)
        } else {
            (LastActionOutcome::Failure, "self_repair_attempted".to_string(), None)
        }
    }

    /// Invoke a `research`-capability-tagged tool to enrich beliefs,
    /// bypassing BDI entirely (spec section 4.5: "does not change active
    /// goal"). The first matching tool is invoked with empty params; its
    /// result is folded into a belief keyed by the tool's own name so later
    /// planning prompts see it via the usual belief query path.
    async fn research(&self) -> (LastActionOutcome, String, Option<GoalStatus>) {
        let candidates = self.tools.with_capability("research").await;
        let Some(tool_name) = candidates.into_iter().next() else {
            return (LastActionOutcome::Failure, "no_research_tool_registered".to_string(), None);
        };

        let (_tx, cancelled) = tokio::sync::watch::channel(false);
        let context = InvocationContext { agent_id: self.agent_id.clone(), caller_type: AgentType::Governor, cancelled };
        match self.tools.invoke(&tool_name, std::collections::HashMap::new(), context).await {
            Ok(result) if result.ok => {
                let key = format!("research.{tool_name}");
                self.beliefs.add(&key, result.value, 0.6, "research_tick", BeliefSource::ToolResult).await;
                (LastActionOutcome::Success, format!("researched via {tool_name}"), None)
            }
            Ok(result) => {
                warn!(tool = %tool_name, error = ?result.error, "research tool returned failure");
                (LastActionOutcome::Failure, "research_tool_failed".to_string(), None)
            }
            Err(e) => {
                warn!(tool = %tool_name, error = %e, "research tool invocation errored");
                (LastActionOutcome::Failure, "research_tool_failed".to_string(), None)
            }
        }
    }

    /// Select a model for the whole decision, then delegate to BDI and
    /// await its outcome. BDI runs a single cycle per delegation (spec
    /// section 4.5: AGInt ticks are the outer loop, BDI cycles the inner
    /// one); the goal's own `status` — not `BdiOutcome::status`, which
    /// reports `Failed` both for a genuine failure and for "ran out of
    /// cycles mid-plan" — is the authoritative terminality signal, since
    /// only a genuine terminal verdict transitions it.
    async fn delegate(&self, goal: &mut Goal, cancel: &mut watch::Receiver<bool>) -> (LastActionOutcome, String, Option<GoalStatus>) {
        let model = select_model(&self.model_candidates, &self.model_weights).map(|c| c.name.clone());
        let BdiOutcome { reason, .. } = self.bdi.run_with_model(goal, 1, cancel, model).await;

        if goal.status.is_terminal() {
            let outcome = if goal.status == GoalStatus::Achieved { LastActionOutcome::Success } else { LastActionOutcome::Failure };
            (outcome, reason, Some(goal.status))
        } else {
            (LastActionOutcome::Failure, reason, None)
        }
    }
}
