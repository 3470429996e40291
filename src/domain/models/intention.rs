//! Intention (Plan) and PlanAction domain models.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single step of a plan: either a registered tool name, or one of the
/// built-in control actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Tool(String),
    CreateAgent,
    UpdateBelief,
    NoOp,
}

impl ActionType {
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::Tool(name) => Some(name),
            _ => None,
        }
    }
}

/// A single planned step. `contingency` fires iff the primary action fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub params: HashMap<String, serde_json::Value>,
    pub contingency: Option<Box<PlanAction>>,
}

impl PlanAction {
    pub fn new(action_type: ActionType, params: HashMap<String, serde_json::Value>) -> Self {
        Self {
            action_type,
            params,
            contingency: None,
        }
    }

    pub fn with_contingency(mut self, contingency: PlanAction) -> Self {
        self.contingency = Some(Box::new(contingency));
        self
    }
}

/// Lifecycle status of an Intention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentionStatus {
    Planned,
    Executing,
    Succeeded,
    Failed,
}

impl IntentionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// A terminal-non-success status: triggers replanning per spec 4.4 step 3.
    pub fn is_terminal_non_success(self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// A committed plan pursuing exactly one goal. `actions` is immutable once
/// planned — a replan creates a brand new Intention linked to the same
/// `goal_id`, it never mutates this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intention {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub actions: Vec<PlanAction>,
    pub cursor: usize,
    pub status: IntentionStatus,
}

impl Intention {
    pub fn new(goal_id: Uuid, actions: Vec<PlanAction>) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal_id,
            actions,
            cursor: 0,
            status: IntentionStatus::Planned,
        }
    }

    pub fn current_action(&self) -> Option<&PlanAction> {
        self.actions.get(self.cursor)
    }

    /// Advance the cursor by one. Monotone non-decreasing; never exceeds
    /// `actions.len()`.
    pub fn advance(&mut self) {
        if self.cursor < self.actions.len() {
            self.cursor += 1;
        }
        if self.cursor == self.actions.len() {
            self.status = IntentionStatus::Succeeded;
        }
    }

    pub fn fail(&mut self) {
        self.status = IntentionStatus::Failed;
    }

    pub fn start(&mut self) {
        if self.status == IntentionStatus::Planned {
            self.status = IntentionStatus::Executing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_never_exceeds_action_count() {
        let mut intent = Intention::new(Uuid::new_v4(), vec![
            PlanAction::new(ActionType::NoOp, HashMap::new()),
            PlanAction::new(ActionType::NoOp, HashMap::new()),
        ]);
        for _ in 0..5 {
            intent.advance();
            assert!(intent.cursor <= intent.actions.len());
        }
        assert_eq!(intent.status, IntentionStatus::Succeeded);
    }
}
