//! Belief Store port (C3).

use async_trait::async_trait;

use crate::domain::models::{Belief, BeliefSource};

/// Port for the keyed, confidence-scored belief store. None of these
/// operations raise: `get` of a missing key simply returns `None`.
#[async_trait]
pub trait BeliefStore: Send + Sync {
    /// Insert a new belief, or delegate to `update` if `key` already exists.
    async fn add(&self, key: &str, value: serde_json::Value, confidence: f64, evidence: &str, source: BeliefSource);

    /// Append evidence and recompute confidence via the store's configured
    /// `ConfidenceRule`.
    async fn update(&self, key: &str, evidence: &str, confidence_delta: Option<f64>);

    async fn get(&self, key: &str) -> Option<Belief>;

    /// Insertion-order-stable query. Default filters exclude superseded
    /// beliefs.
    async fn query(&self, prefix: Option<&str>, min_confidence: Option<f64>, source: Option<BeliefSource>) -> Vec<Belief>;

    async fn invalidate(&self, key: &str, reason: &str);

    /// Merge a belief observed from another agent into this store (spec
    /// section 5's cross-agent write-merge rule: evidence union, confidence
    /// = max).
    async fn merge_external(&self, incoming: Belief);
}
