//! Universal-invariant coverage (spec section 8, invariants 1-10), split
//! into `proptest` property tests over the pure domain models (1-5) and
//! deterministic integration tests against the concrete adapters for the
//! two invariants that only show up under real concurrency / a real
//! restart (9, 10).

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use praxis_core::domain::models::{
    AgentType, Belief, BeliefSource, Goal, GoalStatus, Intention, ToolDescriptor, ToolResult,
};
use praxis_core::domain::ports::tool_registry::InvocationContext;
use praxis_core::domain::ports::{Memory, Tool, ToolRegistry};
use praxis_core::services::{
    AgentFactory, InMemoryAgentRegistry, InMemoryBeliefStore, InMemoryToolRegistry, Mastermind, Secp256k1IdentityManager,
};

// ---------------------------------------------------------------------
// Invariant 1 + 2: confidence bounds, evidence monotonicity (Belief).
// ---------------------------------------------------------------------

proptest! {
    #[test]
    fn belief_confidence_stays_bounded_and_evidence_only_grows(
        start in 0.0f64..=1.0,
        deltas in prop::collection::vec(-1.5f64..=1.5, 0..50),
    ) {
        let mut belief = Belief::new("tool.x.reliability", serde_json::json!(true), start, "seed", BeliefSource::ToolResult);
        let mut last_len = belief.evidence.len();
        for (i, delta) in deltas.iter().enumerate() {
            belief.reinforce(format!("evidence #{i}"), *delta);
            prop_assert!((0.0..=1.0).contains(&belief.confidence));
            prop_assert!(belief.evidence.len() >= last_len);
            last_len = belief.evidence.len();
        }
    }

    #[test]
    fn belief_invalidate_keeps_confidence_bounded_and_evidence_growing(
        start in 0.0f64..=1.0,
        reason in "[a-z ]{1,20}",
    ) {
        let mut belief = Belief::new("k", serde_json::json!(1), start, "seed", BeliefSource::LlmInference);
        let before = belief.evidence.len();
        belief.invalidate(reason);
        prop_assert!((0.0..=1.0).contains(&belief.confidence));
        prop_assert!(belief.evidence.len() > before);
        prop_assert!(belief.superseded);
    }
}

// ---------------------------------------------------------------------
// Invariant 3: Intention cursor monotonicity, never exceeds actions.len().
// ---------------------------------------------------------------------

proptest! {
    #[test]
    fn intention_cursor_never_regresses_or_overruns(action_count in 0usize..20, advances in 0usize..40) {
        use praxis_core::domain::models::{ActionType, PlanAction};
        let actions: Vec<PlanAction> = (0..action_count).map(|_| PlanAction::new(ActionType::NoOp, HashMap::new())).collect();
        let mut intention = Intention::new(uuid::Uuid::new_v4(), actions);
        let mut last_cursor = intention.cursor;
        for _ in 0..advances {
            intention.advance();
            prop_assert!(intention.cursor >= last_cursor);
            prop_assert!(intention.cursor <= intention.actions.len());
            last_cursor = intention.cursor;
        }
    }
}

// ---------------------------------------------------------------------
// Invariant 4: at most one ACTIVE goal at any instant, exercised by
// driving `select_active_goal` + `Goal::transition` the way BDI's own
// desire-evaluation step (spec section 4.4 step 2) would across a batch
// of sibling goals.
// ---------------------------------------------------------------------

proptest! {
    #[test]
    fn at_most_one_goal_is_active_across_a_batch_at_any_step(priorities in prop::collection::vec(1u32..5, 1..8)) {
        let mut goals: Vec<Goal> = priorities.iter().map(|p| Goal::new("agent-1", "do something", *p)).collect();

        loop {
            let pending_snapshot: Vec<Goal> = goals.iter().filter(|g| g.status == GoalStatus::Pending).cloned().collect();
            let Some(picked) = praxis_core::domain::models::select_active_goal(&pending_snapshot) else {
                break;
            };
            let picked_id = picked.id;
            let goal = goals.iter_mut().find(|g| g.id == picked_id).unwrap();
            goal.transition(GoalStatus::Active).unwrap();

            let active_count = goals.iter().filter(|g| g.status == GoalStatus::Active).count();
            prop_assert_eq!(active_count, 1);

            let goal = goals.iter_mut().find(|g| g.id == picked_id).unwrap();
            goal.transition(GoalStatus::Achieved).unwrap();
        }

        prop_assert_eq!(goals.iter().filter(|g| g.status == GoalStatus::Active).count(), 0);
    }
}

// ---------------------------------------------------------------------
// Invariant 5: absorbing terminals — once Achieved/Failed/Abandoned, no
// further transition succeeds, for any attempted next status.
// ---------------------------------------------------------------------

proptest! {
    #[test]
    fn terminal_goal_status_never_transitions_again(
        terminal in prop::sample::select(vec![GoalStatus::Achieved, GoalStatus::Failed, GoalStatus::Abandoned]),
        attempted in prop::sample::select(vec![
            GoalStatus::Pending, GoalStatus::Active, GoalStatus::Achieved, GoalStatus::Failed, GoalStatus::Abandoned,
        ]),
    ) {
        let mut goal = Goal::new("agent-1", "do something", 1);
        goal.transition(GoalStatus::Active).unwrap();
        goal.transition(terminal).unwrap();
        prop_assert_eq!(goal.status, terminal);

        let result = goal.transition(attempted);
        prop_assert!(result.is_err());
        prop_assert_eq!(goal.status, terminal);
    }
}

// ---------------------------------------------------------------------
// Invariant 9: for any agent, at most one side_effects=true invocation is
// in flight at a time. Driven against the real `InMemoryToolRegistry`
// under genuine multi-thread concurrency, not a single-threaded runtime
// that would mask the race.
// ---------------------------------------------------------------------

struct SideEffectProbe {
    in_flight: AtomicBool,
    violations: AtomicU32,
}

struct SlowSideEffectTool {
    descriptor: ToolDescriptor,
    probe: Arc<SideEffectProbe>,
}

#[async_trait::async_trait]
impl Tool for SlowSideEffectTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _params: HashMap<String, serde_json::Value>, _context: InvocationContext) -> ToolResult {
        if self.probe.in_flight.swap(true, Ordering::SeqCst) {
            self.probe.violations.fetch_add(1, Ordering::SeqCst);
        }
        tokio::time::sleep(Duration::from_millis(15)).await;
        self.probe.in_flight.store(false, Ordering::SeqCst);
        ToolResult::success(serde_json::Value::Null)
    }
}

fn invocation_context(agent_id: &str) -> InvocationContext {
    let (_tx, rx) = tokio::sync::watch::channel(false);
    InvocationContext { agent_id: agent_id.to_string(), caller_type: AgentType::Tactical, cancelled: rx }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn side_effecting_tool_invocations_are_serialized_per_agent() {
    let probe = Arc::new(SideEffectProbe { in_flight: AtomicBool::new(false), violations: AtomicU32::new(0) });
    let registry = Arc::new(InMemoryToolRegistry::new());
    let descriptor = ToolDescriptor::new("slow_effect", "1").side_effecting();
    registry.register(Arc::new(SlowSideEffectTool { descriptor, probe: probe.clone() })).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry.invoke("slow_effect", HashMap::new(), invocation_context("agent-1")).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(probe.violations.load(Ordering::SeqCst), 0, "two side-effecting invocations overlapped for the same agent");
}

// ---------------------------------------------------------------------
// Invariant 10: campaign recovery reconstructs the same unfinished/
// finished view of a campaign from the append-only log that a live
// `Mastermind` would report, across a simulated process restart (a
// second `Mastermind` built fresh over the same `Memory` adapter).
// ---------------------------------------------------------------------

/// An `LlmHandler` whose `complete` never resolves, so a campaign built on
/// it can never leave planning and is guaranteed non-terminal for as long
/// as the test holds it — no race against a background task to win.
struct NeverRespondingLlm {
    id: String,
}

#[async_trait::async_trait]
impl praxis_core::domain::ports::LlmHandler for NeverRespondingLlm {
    fn handler_id(&self) -> &str {
        &self.id
    }

    async fn complete(
        &self,
        _prompt: &str,
        _options: praxis_core::domain::ports::llm_handler::CompletionOptions,
    ) -> Result<String, praxis_core::domain::ports::llm_handler::CompletionError> {
        std::future::pending().await
    }

    async fn health_check(&self) -> bool {
        true
    }
}

fn fresh_mastermind(memory: Arc<dyn Memory>, llm: Arc<dyn praxis_core::domain::ports::LlmHandler>) -> Mastermind {
    let tools = Arc::new(InMemoryToolRegistry::default());
    let beliefs = Arc::new(InMemoryBeliefStore::default());
    let identity = Arc::new(Secp256k1IdentityManager::default());
    let registry = Arc::new(InMemoryAgentRegistry::default());
    let agent_factory = Arc::new(AgentFactory::new(identity, tools.clone(), memory.clone(), registry));
    Mastermind::new(llm, common::healthy(), tools, beliefs, memory, agent_factory, praxis_core::domain::models::Config::default())
}

#[tokio::test]
async fn recover_unfinished_reflects_the_log_across_a_simulated_restart() {
    let memory: Arc<dyn Memory> = Arc::new(praxis_core::adapters::memory::InMemoryMemory::new());

    // Process instance A: a campaign starts but the process "crashes" before
    // it reaches a terminal state (planning never returns), so only
    // `campaign_created` — not `campaign_terminal` — lands in the shared log.
    let never_responding: Arc<dyn praxis_core::domain::ports::LlmHandler> =
        Arc::new(NeverRespondingLlm { id: "never".to_string() });
    let mastermind_a = fresh_mastermind(memory.clone(), never_responding);
    let stuck_campaign =
        mastermind_a.submit("a directive that never finishes", praxis_core::services::SubmitOptions::default()).await.unwrap();

    // Process instance B: fresh Mastermind, same log — simulates a restart.
    let mastermind_b = fresh_mastermind(memory.clone(), common::constant_llm("[]"));
    let recovered = mastermind_b.recover_unfinished().await;
    assert!(recovered.contains(&stuck_campaign), "an unfinished campaign must be recovered as pending from the shared log");
    let view = mastermind_b.status(stuck_campaign).await.unwrap();
    assert_eq!(view.state, praxis_core::domain::models::CampaignStatus::Pending);

    // Now let a different campaign actually finish, and confirm recovery
    // correctly excludes it once `campaign_terminal` lands in the same log.
    let tools_c = Arc::new(InMemoryToolRegistry::default());
    tools_c.register(Arc::new(common::EchoTool::new())).await.unwrap();
    let beliefs_c = Arc::new(InMemoryBeliefStore::default());
    let identity_c = Arc::new(Secp256k1IdentityManager::default());
    let registry_c = Arc::new(InMemoryAgentRegistry::default());
    let agent_factory_c = Arc::new(AgentFactory::new(identity_c, tools_c.clone(), memory.clone(), registry_c));
    let mastermind_c = Mastermind::new(
        common::constant_llm(r#"[{"type":"echo","params":{"text":"hi"}}]"#),
        common::healthy(),
        tools_c,
        beliefs_c,
        memory.clone(),
        agent_factory_c,
        praxis_core::domain::models::Config::default(),
    );
    let finished_campaign =
        mastermind_c.submit("a directive that finishes", praxis_core::services::SubmitOptions::default()).await.unwrap();
    common::wait_for_terminal(&mastermind_c, finished_campaign).await.unwrap();

    let mastermind_d = fresh_mastermind(memory.clone(), common::constant_llm("[]"));
    let recovered_again = mastermind_d.recover_unfinished().await;
    assert!(!recovered_again.contains(&finished_campaign), "a completed campaign must not be recovered as pending");
}
