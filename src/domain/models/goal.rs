//! Goal domain model (the Desire in BDI).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Lifecycle status of a goal. Terminal states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    Active,
    Achieved,
    Failed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Achieved => "achieved",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "achieved" => Some(Self::Achieved),
            "failed" => Some(Self::Failed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    /// Once achieved/failed/abandoned, a goal never transitions out.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Achieved | Self::Failed | Self::Abandoned)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Pending, Self::Abandoned)
                | (Self::Active, Self::Achieved)
                | (Self::Active, Self::Failed)
                | (Self::Active, Self::Abandoned)
                | (Self::Active, Self::Pending)
        )
    }
}

/// A goal: the BDI planner's unit of desire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub agent_id: String,
    pub description: String,
    /// 1 = most important.
    pub priority: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub required_capabilities: HashSet<String>,
    pub status: GoalStatus,
    pub parent_goal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(agent_id: impl Into<String>, description: impl Into<String>, priority: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            description: description.into(),
            priority,
            deadline: None,
            required_capabilities: HashSet::new(),
            status: GoalStatus::Pending,
            parent_goal_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(&mut self, next: GoalStatus) -> Result<(), crate::domain::errors::DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(crate::domain::errors::DomainError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Tie-break ordering per spec section 4.4: nearer deadline first, then
    /// lexicographic id, assuming equal priority.
    pub fn tie_break_key(&self) -> (Option<DateTime<Utc>>, Uuid) {
        (self.deadline, self.id)
    }
}

/// Select the highest-priority PENDING goal among candidates, applying the
/// deadline-then-id tie-break from spec section 4.4.
pub fn select_active_goal(candidates: &[Goal]) -> Option<&Goal> {
    candidates
        .iter()
        .filter(|g| g.status == GoalStatus::Pending)
        .min_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.tie_break_key().cmp(&b.tie_break_key()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_absorbing() {
        let mut g = Goal::new("agent-1", "do a thing", 1);
        g.transition(GoalStatus::Active).unwrap();
        g.transition(GoalStatus::Achieved).unwrap();
        assert!(g.transition(GoalStatus::Active).is_err());
        assert!(g.transition(GoalStatus::Pending).is_err());
    }

    #[test]
    fn tie_break_prefers_nearer_deadline_then_id() {
        let mut a = Goal::new("agent-1", "a", 1);
        let mut b = Goal::new("agent-1", "b", 1);
        a.deadline = Some(Utc::now());
        b.deadline = Some(Utc::now() + chrono::Duration::hours(1));
        let picked = select_active_goal(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(picked.id, a.id);
    }
}
