//! In-process Belief Store (C3).

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::models::{Belief, BeliefSource, ConfidenceRule, ReinforcementRule};
use crate::domain::ports::BeliefStore;

/// Default `BeliefStore`: single writer per agent via an `RwLock`-guarded
/// `HashMap`, insertion order preserved via a companion `Vec<String>` of
/// keys so `query` stays insertion-order-stable.
pub struct InMemoryBeliefStore {
    rule: Arc<dyn ConfidenceRule>,
    beliefs: RwLock<HashMap<String, Belief>>,
    insertion_order: RwLock<Vec<String>>,
}

impl Default for InMemoryBeliefStore {
    fn default() -> Self {
        Self::new(Arc::new(ReinforcementRule))
    }
}

impl InMemoryBeliefStore {
    pub fn new(rule: Arc<dyn ConfidenceRule>) -> Self {
        Self {
            rule,
            beliefs: RwLock::new(HashMap::new()),
            insertion_order: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl BeliefStore for InMemoryBeliefStore {
    async fn add(&self, key: &str, value: serde_json::Value, confidence: f64, evidence: &str, source: BeliefSource) {
        let exists = self.beliefs.read().await.contains_key(key);
        if exists {
            self.update(key, evidence, Some(confidence)).await;
            return;
        }
        let belief = Belief::new(key, value, confidence, evidence, source);
        self.beliefs.write().await.insert(key.to_string(), belief);
        self.insertion_order.write().await.push(key.to_string());
    }

    async fn update(&self, key: &str, evidence: &str, confidence_delta: Option<f64>) {
        let mut beliefs = self.beliefs.write().await;
        if let Some(belief) = beliefs.get_mut(key) {
            belief.evidence.push(evidence.to_string());
            if let Some(delta) = confidence_delta {
                belief.confidence = self.rule.combine(belief.confidence, delta);
            }
            belief.updated_at = chrono::Utc::now();
        } else {
            drop(beliefs);
            self.add(key, serde_json::Value::Null, confidence_delta.unwrap_or(0.5), evidence, BeliefSource::Inherited)
                .await;
        }
    }

    async fn get(&self, key: &str) -> Option<Belief> {
        self.beliefs.read().await.get(key).cloned()
    }

    async fn query(&self, prefix: Option<&str>, min_confidence: Option<f64>, source: Option<BeliefSource>) -> Vec<Belief> {
        let beliefs = self.beliefs.read().await;
        let order = self.insertion_order.read().await;
        order
            .iter()
            .filter_map(|key| beliefs.get(key))
            .filter(|b| !b.superseded)
            .filter(|b| prefix.map_or(true, |p| b.key.starts_with(p)))
            .filter(|b| min_confidence.map_or(true, |m| b.confidence >= m))
            .filter(|b| source.map_or(true, |s| b.source == s))
            .cloned()
            .collect()
    }

    async fn invalidate(&self, key: &str, reason: &str) {
        if let Some(belief) = self.beliefs.write().await.get_mut(key) {
            belief.invalidate(reason);
        }
    }

    async fn merge_external(&self, incoming: Belief) {
        let mut beliefs = self.beliefs.write().await;
        match beliefs.get_mut(&incoming.key) {
            Some(existing) => existing.merge(&incoming),
            None => {
                let key = incoming.key.clone();
                beliefs.insert(key.clone(), incoming);
                drop(beliefs);
                self.insertion_order.write().await.push(key);
            }
        }
    }
}

/// Detect two non-superseded beliefs sharing a key but differing in value
/// (spec section 4.4 step 1's contradiction detection). Returns the key of
/// the belief that should be superseded: the lower-confidence one, or on a
/// tie the older one (spec section 4.4's tie-break).
pub fn contradiction_loser<'a>(a: &'a Belief, b: &'a Belief) -> Option<&'a Belief> {
    if a.key != b.key || a.value == b.value {
        return None;
    }
    if (a.confidence - b.confidence).abs() < f64::EPSILON {
        Some(if a.updated_at < b.updated_at { a } else { b })
    } else if a.confidence < b.confidence {
        Some(a)
    } else {
        Some(b)
    }
}
