//! Memory event model (C4 — Memory Interface) and the core event stream
//! (spec section 6 — `subscribe`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An append-only structured event written by an agent to its memory log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub process_name: String,
    pub data: serde_json::Value,
    pub tags: Vec<String>,
    pub parent_id: Option<Uuid>,
}

impl MemoryEvent {
    pub fn new(agent_id: impl Into<String>, process_name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            agent_id: agent_id.into(),
            process_name: process_name.into(),
            data,
            tags: Vec::new(),
            parent_id: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// A filter over memory events used by `Memory::query`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryFilter {
    pub agent_id: Option<String>,
    pub process_name: Option<String>,
    pub tag: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

/// The five-plus-one event kinds the core event stream may emit. Spec
/// section 6 says "exactly five" then lists six tokens; all six are
/// implemented (see SPEC_FULL.md's Open Questions resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Status,
    Phase,
    Cycle,
    Action,
    Complete,
    Error,
}

/// A single event on a campaign's `subscribe` stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreEvent {
    pub timestamp: DateTime<Utc>,
    pub campaign_id: Uuid,
    pub kind: EventKind,
    pub payload: serde_json::Value,
}

impl CoreEvent {
    pub fn new(campaign_id: Uuid, kind: EventKind, payload: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            campaign_id,
            kind,
            payload,
        }
    }
}
