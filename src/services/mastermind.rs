//! Mastermind Orchestrator (C8) — the strategic entrypoint.
//!
//! Grounded in the teacher's `services/phase_orchestrator.rs`: a service
//! that accepts a unit of work, tracks it in an in-memory map of active
//! instances guarded by `RwLock`, and drives it forward by delegating to a
//! lower-tier component (there, `DagExecutor`/`OvermindService`; here, one
//! `AgintGovernor` per campaign) while publishing progress on an
//! `EventBus`-shaped broadcast channel. `submit`/`status`/`cancel` are the
//! only surface spec section 6 exposes; everything else is campaign
//! bookkeeping behind it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::models::{
    Campaign, CampaignStatus, Config, CoreEvent, Decision, EventKind, Goal, GoalStatus, LastActionOutcome,
    MemoryEvent, ModelCandidate,
};
use crate::domain::ports::{BeliefStore, LlmHandler, Memory, ToolRegistry};
use crate::services::agent_factory::AgentFactory;
use crate::services::agint::{AgintGovernor, HealthProbe, ProgressSink, TickReport};
use crate::services::bdi::BdiReasoner;

/// Options accepted by `submit`, per spec section 6.
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    pub max_cycles: Option<u32>,
    pub model_preference: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MastermindError {
    #[error("campaign not found: {0}")]
    NotFound(Uuid),
    #[error("a campaign is already running")]
    AlreadyRunning,
}

/// What `status(campaign_id)` returns, exactly the fields spec section 6
/// names.
#[derive(Debug, Clone)]
pub struct CampaignView {
    pub campaign_id: Uuid,
    pub state: CampaignStatus,
    pub current_decision: Option<Decision>,
    pub active_goal: Option<Goal>,
    pub last_actions: Vec<String>,
    pub belief_snapshot_ref: String,
}

struct CampaignEntry {
    agent_id: String,
    campaign: Arc<RwLock<Campaign>>,
    goal: Arc<RwLock<Goal>>,
    current_decision: Arc<RwLock<Option<Decision>>>,
    cancel_tx: watch::Sender<bool>,
    events_tx: broadcast::Sender<CoreEvent>,
}

/// The narrow upward callback AGInt reports through (spec section 9's
/// "Cyclic references" redesign note). Translates a tick into campaign
/// history, the `subscribe` event stream, and a memory event — Mastermind
/// never reaches down into AGInt's own state.
struct MastermindSink {
    campaign_id: Uuid,
    agent_id: String,
    campaign: Arc<RwLock<Campaign>>,
    current_decision: Arc<RwLock<Option<Decision>>>,
    memory: Arc<dyn Memory>,
    events_tx: broadcast::Sender<CoreEvent>,
}

#[async_trait::async_trait]
impl ProgressSink for MastermindSink {
    async fn on_progress(&self, report: TickReport) {
        *self.current_decision.write().await = Some(report.decision);

        let phase = match report.decision {
            Decision::Cooldown => "cooldown",
            Decision::SelfRepair => "self_repair",
            Decision::Research => "research",
            Decision::Delegate => "delegate",
        };
        self.campaign.write().await.record(phase, report.detail.clone());

        let _ = self.events_tx.send(CoreEvent::new(
            self.campaign_id,
            EventKind::Cycle,
            serde_json::json!({ "decision": phase }),
        ));

        let ok = report.outcome != LastActionOutcome::Failure;
        let _ = self.events_tx.send(CoreEvent::new(
            self.campaign_id,
            EventKind::Action,
            serde_json::json!({ "ok": ok, "decision": phase, "reason": report.detail }),
        ));

        let event = MemoryEvent::new(
            &self.agent_id,
            "agint_tick",
            serde_json::json!({ "decision": phase, "ok": ok, "detail": report.detail }),
        )
        .with_tags(vec!["cycle".to_string()]);
        let _ = self.memory.append(event).await;
    }
}

/// Owns every live campaign for this process. One `Mastermind` is the
/// "one authoritative instance per logical role" the teacher's singleton
/// services (spec section 9) are reduced to: constructed once at process
/// start and passed by reference, never a global.
pub struct Mastermind {
    llm: Arc<dyn LlmHandler>,
    health: Arc<dyn HealthProbe>,
    tools: Arc<dyn ToolRegistry>,
    beliefs: Arc<dyn BeliefStore>,
    memory: Arc<dyn Memory>,
    agent_factory: Arc<AgentFactory>,
    config: Config,
    campaigns: Arc<RwLock<HashMap<Uuid, CampaignEntry>>>,
    active_campaign: Arc<RwLock<Option<Uuid>>>,
}

impl Mastermind {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Arc<dyn LlmHandler>,
        health: Arc<dyn HealthProbe>,
        tools: Arc<dyn ToolRegistry>,
        beliefs: Arc<dyn BeliefStore>,
        memory: Arc<dyn Memory>,
        agent_factory: Arc<AgentFactory>,
        config: Config,
    ) -> Self {
        Self {
            llm,
            health,
            tools,
            beliefs,
            memory,
            agent_factory,
            config,
            campaigns: Arc::new(RwLock::new(HashMap::new())),
            active_campaign: Arc::new(RwLock::new(None)),
        }
    }

    fn model_candidates(&self, preference: Option<&str>) -> Vec<ModelCandidate> {
        let name = preference.map_or_else(|| self.config.default_model.clone(), str::to_string);
        vec![ModelCandidate {
            name,
            provider: self.config.default_provider.clone(),
            capability_match: 1.0,
            recent_success_rate: 1.0,
            latency_ms: 1.0,
            cost_per_1k: 1.0,
        }]
    }

    /// Creates a Campaign, a root Goal, and an AGInt instance; starts its
    /// loop (spec section 4.6). Enforces "one active campaign per
    /// Mastermind" (spec section 4.6's invariant).
    #[instrument(skip(self, options), fields(directive = %directive.as_ref()))]
    pub async fn submit(&self, directive: impl AsRef<str>, options: SubmitOptions) -> Result<Uuid, MastermindError> {
        {
            let active = *self.active_campaign.read().await;
            if let Some(existing) = active {
                let campaigns = self.campaigns.read().await;
                if let Some(entry) = campaigns.get(&existing) {
                    if !entry.campaign.read().await.status.is_terminal() {
                        return Err(MastermindError::AlreadyRunning);
                    }
                }
            }
        }

        let directive = directive.as_ref().to_string();
        let campaign_id = Uuid::new_v4();
        let agent_id = format!("campaign-{campaign_id}");
        let root_goal = Goal::new(&agent_id, directive.clone(), 1);

        let now = Utc::now();
        let mut campaign = Campaign {
            id: campaign_id,
            directive: directive.clone(),
            root_goal_id: root_goal.id,
            history: Vec::new(),
            status: CampaignStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        campaign.transition(CampaignStatus::Running);

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (events_tx, _) = broadcast::channel(256);
        let campaign_arc = Arc::new(RwLock::new(campaign));
        let goal_arc = Arc::new(RwLock::new(root_goal.clone()));
        let current_decision = Arc::new(RwLock::new(None));

        self.campaigns.write().await.insert(
            campaign_id,
            CampaignEntry {
                agent_id: agent_id.clone(),
                campaign: campaign_arc.clone(),
                goal: goal_arc.clone(),
                current_decision: current_decision.clone(),
                cancel_tx,
                events_tx: events_tx.clone(),
            },
        );
        *self.active_campaign.write().await = Some(campaign_id);

        let created_event = MemoryEvent::new(
            &agent_id,
            "mastermind",
            serde_json::json!({ "event": "campaign_created", "directive": directive }),
        )
        .with_tags(vec!["campaign_created".to_string()]);
        let _ = self.memory.append(created_event).await;
        let _ = events_tx.send(CoreEvent::new(campaign_id, EventKind::Status, serde_json::json!({ "status": "running" })));

        let bdi = Arc::new(BdiReasoner::new(
            self.llm.clone(),
            self.beliefs.clone(),
            self.memory.clone(),
            self.tools.clone(),
            self.agent_factory.clone(),
            agent_id.clone(),
            std::time::Duration::from_millis(self.config.tool_timeout_ms),
        ));
        let sink = Arc::new(MastermindSink {
            campaign_id,
            agent_id: agent_id.clone(),
            campaign: campaign_arc.clone(),
            current_decision: current_decision.clone(),
            memory: self.memory.clone(),
            events_tx: events_tx.clone(),
        });
        let governor = AgintGovernor::new(
            self.llm.clone(),
            self.health.clone(),
            bdi,
            self.tools.clone(),
            self.beliefs.clone(),
            sink,
            agent_id.clone(),
            self.config.model_selection_weights.clone(),
            self.model_candidates(options.model_preference.as_deref()),
            std::time::Duration::from_millis(self.config.cycle_timeout_ms),
            self.config.cooldown_base_ms,
            self.config.cooldown_cap_ms,
        );

        let max_cycles = options.max_cycles.unwrap_or(self.config.max_cycles);
        let memory = self.memory.clone();
        let active_campaign = self.active_campaign.clone();
        let mut goal = root_goal;

        tokio::spawn(async move {
            let outcome = governor.run_campaign(&mut goal, max_cycles, &mut cancel_rx).await;
            *goal_arc.write().await = goal;

            let final_status = match outcome.status {
                GoalStatus::Achieved => CampaignStatus::Completed,
                GoalStatus::Abandoned => CampaignStatus::Abandoned,
                _ => CampaignStatus::Failed,
            };
            {
                let mut campaign = campaign_arc.write().await;
                campaign.record("terminal", outcome.reason.clone());
                campaign.transition(final_status);
            }

            let kind = if final_status == CampaignStatus::Completed { EventKind::Complete } else { EventKind::Error };
            let _ = events_tx.send(CoreEvent::new(
                campaign_id,
                kind,
                serde_json::json!({ "status": final_status.as_str(), "reason": outcome.reason, "cycles_run": outcome.cycles_run }),
            ));

            let terminal_event = MemoryEvent::new(
                &agent_id,
                "mastermind",
                serde_json::json!({ "event": "campaign_terminal", "status": final_status.as_str(), "reason": outcome.reason }),
            )
            .with_tags(vec!["campaign_terminal".to_string()]);
            let _ = memory.append(terminal_event).await;

            let mut active = active_campaign.write().await;
            if *active == Some(campaign_id) {
                *active = None;
            }
        });

        Ok(campaign_id)
    }

    /// Current campaign state and last-N history items (spec section 6).
    pub async fn status(&self, campaign_id: Uuid) -> Result<CampaignView, MastermindError> {
        let campaigns = self.campaigns.read().await;
        let entry = campaigns.get(&campaign_id).ok_or(MastermindError::NotFound(campaign_id))?;

        let campaign = entry.campaign.read().await;
        let goal = entry.goal.read().await;
        let current_decision = *entry.current_decision.read().await;
        let last_actions = campaign
            .history
            .iter()
            .rev()
            .take(10)
            .map(|h| format!("{}: {}", h.phase, h.outcome_summary))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        Ok(CampaignView {
            campaign_id,
            state: campaign.status,
            current_decision,
            active_goal: Some(goal.clone()),
            last_actions,
            belief_snapshot_ref: entry.agent_id.clone(),
        })
    }

    /// Subscribe to a campaign's event stream (spec section 6).
    pub async fn subscribe(&self, campaign_id: Uuid) -> Result<broadcast::Receiver<CoreEvent>, MastermindError> {
        let campaigns = self.campaigns.read().await;
        let entry = campaigns.get(&campaign_id).ok_or(MastermindError::NotFound(campaign_id))?;
        Ok(entry.events_tx.subscribe())
    }

    /// Signals the AGInt loop to exit at the next safe point (spec section
    /// 4.6): the end of the current P-O-D-A tick, checked by `run_campaign`
    /// right after Perceive.
    pub async fn cancel(&self, campaign_id: Uuid) -> Result<(), MastermindError> {
        let campaigns = self.campaigns.read().await;
        let entry = campaigns.get(&campaign_id).ok_or(MastermindError::NotFound(campaign_id))?;
        let _ = entry.cancel_tx.send(true);
        Ok(())
    }

    /// Reconstructs unfinished campaigns from the append-only log on
    /// restart (spec section 4.6): they load as `Pending` with all prior
    /// history visible but their loop is not resumed automatically — the
    /// operator chooses whether to `submit` a continuation.
    pub async fn recover_unfinished(&self) -> Vec<Uuid> {
        let created = self
            .memory
            .query(crate::domain::models::MemoryFilter {
                tag: Some("campaign_created".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_or_default();
        let terminal = self
            .memory
            .query(crate::domain::models::MemoryFilter {
                tag: Some("campaign_terminal".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_or_default();
        let finished: std::collections::HashSet<String> = terminal.into_iter().map(|e| e.agent_id).collect();

        let mut recovered = Vec::new();
        let mut campaigns = self.campaigns.write().await;
        for event in created {
            if finished.contains(&event.agent_id) {
                continue;
            }
            let Some(campaign_id) = event.agent_id.strip_prefix("campaign-").and_then(|s| Uuid::parse_str(s).ok()) else {
                continue;
            };
            if campaigns.contains_key(&campaign_id) {
                continue;
            }
            let directive = event.data.get("directive").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let goal = Goal::new(&event.agent_id, directive.clone(), 1);
            let campaign = Campaign {
                id: campaign_id,
                directive,
                root_goal_id: goal.id,
                history: Vec::new(),
                status: CampaignStatus::Pending,
                created_at: event.timestamp,
                updated_at: event.timestamp,
            };
            let (cancel_tx, _) = watch::channel(false);
            let (events_tx, _) = broadcast::channel(256);
            campaigns.insert(
                campaign_id,
                CampaignEntry {
                    agent_id: event.agent_id,
                    campaign: Arc::new(RwLock::new(campaign)),
                    goal: Arc::new(RwLock::new(goal)),
                    current_decision: Arc::new(RwLock::new(None)),
                    cancel_tx,
                    events_tx,
                },
            );
            recovered.push(campaign_id);
        }
        recovered
    }
}
