//! In-process `Memory` backing for unit and scenario tests.

use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{MemoryEvent, MemoryFilter};
use crate::domain::ports::Memory;

#[derive(Default)]
pub struct InMemoryMemory {
    events: RwLock<Vec<MemoryEvent>>,
    snapshots: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Memory for InMemoryMemory {
    async fn append(&self, event: MemoryEvent) -> DomainResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn query(&self, filter: MemoryFilter) -> DomainResult<Vec<MemoryEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| filter.agent_id.as_ref().is_none_or(|a| &e.agent_id == a))
            .filter(|e| filter.process_name.as_ref().is_none_or(|p| &e.process_name == p))
            .filter(|e| filter.tag.as_ref().is_none_or(|t| e.tags.contains(t)))
            .filter(|e| filter.since.is_none_or(|since| e.timestamp >= since))
            .cloned()
            .collect())
    }

    async fn snapshot(&self, agent_id: &str) -> DomainResult<Option<serde_json::Value>> {
        Ok(self.snapshots.read().await.get(agent_id).cloned())
    }

    async fn save_snapshot(&self, agent_id: &str, blob: serde_json::Value) -> DomainResult<()> {
        self.snapshots.write().await.insert(agent_id.to_string(), blob);
        Ok(())
    }

    async fn events_since(&self, agent_id: &str, since: Option<Uuid>) -> DomainResult<Vec<MemoryEvent>> {
        let events = self.events.read().await;
        let start = match since {
            None => 0,
            Some(id) => events
                .iter()
                .position(|e| e.id == id)
                .map_or(0, |pos| pos + 1),
        };
        Ok(events
            .iter()
            .skip(start)
            .filter(|e| e.agent_id == agent_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MemoryEvent;

    #[tokio::test]
    async fn events_since_excludes_already_seen() {
        let memory = InMemoryMemory::new();
        let e1 = MemoryEvent::new("a1", "test", serde_json::json!({"n": 1}));
        let e1_id = e1.id;
        memory.append(e1).await.unwrap();
        memory.append(MemoryEvent::new("a1", "test", serde_json::json!({"n": 2}))).await.unwrap();

        let all = memory.events_since("a1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let remainder = memory.events_since("a1", Some(e1_id)).await.unwrap();
        assert_eq!(remainder.len(), 1);
        assert_eq!(remainder[0].data, serde_json::json!({"n": 2}));
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let memory = InMemoryMemory::new();
        assert!(memory.snapshot("a1").await.unwrap().is_none());
        memory.save_snapshot("a1", serde_json::json!({"beliefs": []})).await.unwrap();
        assert_eq!(memory.snapshot("a1").await.unwrap(), Some(serde_json::json!({"beliefs": []})));
    }
}
