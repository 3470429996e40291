//! Campaign domain model (owned by the Mastermind / C8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Abandoned,
}

impl CampaignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Abandoned)
    }
}

/// One entry in a campaign's append-only history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub phase: String,
    pub outcome_summary: String,
}

/// The top-level unit of work: a directive, its root goal, and its history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub directive: String,
    pub root_goal_id: Uuid,
    pub history: Vec<CampaignHistoryEntry>,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(directive: impl Into<String>, root_goal_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            directive: directive.into(),
            root_goal_id,
            history: Vec::new(),
            status: CampaignStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append-only: history entries are never removed or rewritten.
    pub fn record(&mut self, phase: impl Into<String>, outcome_summary: impl Into<String>) {
        self.history.push(CampaignHistoryEntry {
            timestamp: Utc::now(),
            phase: phase.into(),
            outcome_summary: outcome_summary.into(),
        });
        self.updated_at = Utc::now();
    }

    pub fn transition(&mut self, next: CampaignStatus) {
        if self.status.is_terminal() {
            return;
        }
        self.status = next;
        self.updated_at = Utc::now();
    }
}
