//! Domain models for the cognitive core.

pub mod agent_state;
pub mod belief;
pub mod campaign;
pub mod config;
pub mod decision;
pub mod event;
pub mod goal;
pub mod intention;
pub mod tool;

pub use agent_state::{AgentState, AgentStatus, AgentType};
pub use belief::{Belief, BeliefSource, ConfidenceRule, ReinforcementRule};
pub use campaign::{Campaign, CampaignHistoryEntry, CampaignStatus};
pub use config::{Config, DatabaseConfig, LoggingConfig, ModelCandidate, ModelSelectionWeights};
pub use decision::{decide, Decision, LastActionOutcome, LlmHealth, SituationalSummary, SystemHealth};
pub use event::{CoreEvent, EventKind, MemoryEvent, MemoryFilter};
pub use goal::{select_active_goal, Goal, GoalStatus};
pub use intention::{ActionType, Intention, IntentionStatus, PlanAction};
pub use tool::{CallerAcl, ParamSpec, ToolDescriptor, ToolResult};
