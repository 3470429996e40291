//! AGInt decision model (C7 — Cognitive Governor's P-O-D-A cycle).

use serde::{Deserialize, Serialize};

/// Health of the embedded LLM handler, as probed by Perceive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmHealth {
    Operational,
    Degraded,
    Down,
}

/// Host-process health, as probed by Perceive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    Healthy,
    Overloaded,
    Unhealthy,
}

/// The outcome of the previous Act phase, feeding the Decide rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastActionOutcome {
    Success,
    Failure,
    None,
}

/// The situational summary assembled by Orient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SituationalSummary {
    pub system_health: SystemHealth,
    pub llm_health: LlmHealth,
    pub last_action_outcome: LastActionOutcome,
    pub campaign_progress: String,
}

/// The decision Decide selects, first-match-wins over spec section 4.5's
/// rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Cooldown,
    SelfRepair,
    Research,
    Delegate,
}

/// Evaluate the Decide rule table. First matching row wins, exactly as
/// spec section 4.5 enumerates it.
pub fn decide(summary: &SituationalSummary) -> Decision {
    if summary.system_health == SystemHealth::Overloaded {
        return Decision::Cooldown;
    }
    if summary.system_health == SystemHealth::Unhealthy {
        return Decision::SelfRepair;
    }
    if summary.llm_health != LlmHealth::Operational {
        return Decision::SelfRepair;
    }
    if summary.last_action_outcome == LastActionOutcome::Failure {
        return Decision::Research;
    }
    Decision::Delegate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_wins_over_everything() {
        let s = SituationalSummary {
            system_health: SystemHealth::Overloaded,
            llm_health: LlmHealth::Down,
            last_action_outcome: LastActionOutcome::Failure,
            campaign_progress: String::new(),
        };
        assert_eq!(decide(&s), Decision::Cooldown);
    }

    #[test]
    fn healthy_operational_success_delegates() {
        let s = SituationalSummary {
            system_health: SystemHealth::Healthy,
            llm_health: LlmHealth::Operational,
            last_action_outcome: LastActionOutcome::Success,
            campaign_progress: String::new(),
        };
        assert_eq!(decide(&s), Decision::Delegate);
    }

    #[test]
    fn healthy_operational_failure_researches() {
        let s = SituationalSummary {
            system_health: SystemHealth::Healthy,
            llm_health: LlmHealth::Operational,
            last_action_outcome: LastActionOutcome::Failure,
            campaign_progress: String::new(),
        };
        assert_eq!(decide(&s), Decision::Research);
    }
}
