//! Memory Interface port (C4). Append-only event log plus snapshot, exactly
//! per spec section 6's "Memory contract".

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{MemoryEvent, MemoryFilter};

#[async_trait]
pub trait Memory: Send + Sync {
    async fn append(&self, event: MemoryEvent) -> DomainResult<()>;

    async fn query(&self, filter: MemoryFilter) -> DomainResult<Vec<MemoryEvent>>;

    /// A serialized blob of an agent's belief store, taken at configurable
    /// intervals and on clean shutdown; used by recovery to replay the log
    /// on top of the newest snapshot.
    async fn snapshot(&self, agent_id: &str) -> DomainResult<Option<serde_json::Value>>;

    async fn save_snapshot(&self, agent_id: &str, blob: serde_json::Value) -> DomainResult<()>;

    /// Events appended since a given logical cursor (campaign tick count or
    /// event id), used by BDI's belief-revision step.
    async fn events_since(&self, agent_id: &str, since: Option<Uuid>) -> DomainResult<Vec<MemoryEvent>>;
}
