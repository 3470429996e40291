//! Belief domain model (C3 — Belief Store).
//!
//! A belief is a keyed fact with a confidence score that only ever moves via
//! evidence accrual or explicit invalidation — never silently reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a belief's value ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeliefSource {
    Perception,
    ToolResult,
    LlmInference,
    User,
    Inherited,
}

impl BeliefSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Perception => "perception",
            Self::ToolResult => "tool_result",
            Self::LlmInference => "llm_inference",
            Self::User => "user",
            Self::Inherited => "inherited",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "perception" => Some(Self::Perception),
            "tool_result" => Some(Self::ToolResult),
            "llm_inference" => Some(Self::LlmInference),
            "user" => Some(Self::User),
            "inherited" => Some(Self::Inherited),
            _ => None,
        }
    }
}

/// A belief keyed by a dotted string, unique within its store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Belief {
    pub key: String,
    pub value: serde_json::Value,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub source: BeliefSource,
    pub superseded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Belief {
    pub fn new(
        key: impl Into<String>,
        value: serde_json::Value,
        confidence: f64,
        evidence: impl Into<String>,
        source: BeliefSource,
    ) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value,
            confidence: confidence.clamp(0.0, 1.0),
            evidence: vec![evidence.into()],
            source,
            superseded: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an evidence item and recompute confidence via the supplied
    /// reinforcement delta, clamped to `[0, 1]`. Evidence is append-only;
    /// `updated_at` advances, `created_at` never changes.
    pub fn reinforce(&mut self, evidence: impl Into<String>, delta: f64) {
        self.evidence.push(evidence.into());
        self.confidence = reinforce(self.confidence, delta);
        self.updated_at = Utc::now();
    }

    /// Mark this belief `superseded`. Retained for audit, excluded from
    /// default-filter queries.
    pub fn invalidate(&mut self, reason: impl Into<String>) {
        self.evidence.push(format!("invalidated: {}", reason.into()));
        self.superseded = true;
        self.updated_at = Utc::now();
    }

    /// Merge a concurrent write to the same key from another agent:
    /// evidence list union, confidence = max (spec section 5's
    /// cross-agent write-merge rule).
    pub fn merge(&mut self, other: &Belief) {
        for item in &other.evidence {
            if !self.evidence.contains(item) {
                self.evidence.push(item.clone());
            }
        }
        self.confidence = self.confidence.max(other.confidence);
        self.updated_at = self.updated_at.max(other.updated_at);
    }
}

/// Default confidence-reinforcement rule (spec section 4.2): a positive
/// delta saturates confidence toward 1 via `1 - (1-c)(1-delta)`; any other
/// delta (including negative) is a plain additive clamp. Deterministic and
/// monotone for positive evidence, which is all invariant 1/2 require.
pub fn reinforce(confidence: f64, delta: f64) -> f64 {
    if (0.0..=1.0).contains(&delta) {
        (1.0 - (1.0 - confidence) * (1.0 - delta)).clamp(0.0, 1.0)
    } else {
        (confidence + delta).clamp(0.0, 1.0)
    }
}

/// Pluggable confidence-update strategy (Open Question 1 in spec section 9
/// — the combination rule is left implementation-defined but must be
/// deterministic and pluggable).
pub trait ConfidenceRule: Send + Sync {
    fn combine(&self, current: f64, delta: f64) -> f64;
}

/// The default rule, wrapping `reinforce` above.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReinforcementRule;

impl ConfidenceRule for ReinforcementRule {
    fn combine(&self, current: f64, delta: f64) -> f64 {
        reinforce(current, delta)
    }
}
