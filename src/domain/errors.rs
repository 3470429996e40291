//! Error taxonomy for the cognitive core.
//!
//! Two layers, mirroring the split used throughout this codebase:
//! `DomainError` for data-model invariant violations, `CoreError` for the
//! kind/reason taxonomy a running campaign produces (spec section 7).
//! Neither ever crosses a cooperative boundary as a panic or raw exception;
//! they are typed outcome values propagated through `Result`.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors: violations of the data model's own invariants.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("belief not found: {0}")]
    BeliefNotFound(String),

    #[error("goal not found: {0}")]
    GoalNotFound(Uuid),

    #[error("intention not found for goal: {0}")]
    IntentionNotFound(Uuid),

    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("another goal is already active for this agent: {0}")]
    GoalAlreadyActive(Uuid),

    #[error("confidence {0} out of bounds [0,1]")]
    ConfidenceOutOfBounds(f64),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Reason codes for `PlanningError`, matching spec section 7 literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanningReason {
    #[error("planning_failed")]
    PlanningFailed,
    #[error("plan_invalid")]
    PlanInvalid,
    #[error("capability_lost")]
    CapabilityLost,
}

/// Reason codes for `ExecutionError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionReason {
    #[error("tool_failed")]
    ToolFailed,
    #[error("tool_timeout")]
    ToolTimeout,
    #[error("parameter_invalid")]
    ParameterInvalid,
}

/// Reason codes for `DependencyError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DependencyReason {
    #[error("llm_unavailable")]
    LlmUnavailable,
    #[error("identity_store_unavailable")]
    IdentityStoreUnavailable,
}

/// Reason codes for `ResourceError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResourceReason {
    #[error("overloaded")]
    Overloaded,
}

/// Reason codes for `IntegrityError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntegrityReason {
    #[error("belief_contradiction_unresolvable")]
    BeliefContradictionUnresolvable,
    #[error("registry_corruption")]
    RegistryCorruption,
}

/// Reason codes for `Unrecoverable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnrecoverableReason {
    #[error("max_self_repair_exceeded")]
    MaxSelfRepairExceeded,
    #[error("cancellation")]
    Cancellation,
}

/// The kind/reason taxonomy from spec section 7. Recoverability is encoded
/// in *where* a variant is handled, not in the type itself: `PlanningError`
/// and `ExecutionError` are handled inside BDI, `DependencyError` and
/// `ResourceError` inside AGInt, `IntegrityError` and `Unrecoverable` escape
/// to the Mastermind / campaign boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("planning error: {0}")]
    Planning(PlanningReason),

    #[error("execution error: {0}")]
    Execution(ExecutionReason),

    #[error("dependency error: {0}")]
    Dependency(DependencyReason),

    #[error("resource error: {0}")]
    Resource(ResourceReason),

    #[error("integrity error: {0}")]
    Integrity(IntegrityReason),

    #[error("unrecoverable: {0}")]
    Unrecoverable(UnrecoverableReason),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CoreError {
    /// The reason string as it appears in event-stream payloads.
    pub fn reason_code(&self) -> String {
        match self {
            Self::Planning(r) => r.to_string(),
            Self::Execution(r) => r.to_string(),
            Self::Dependency(r) => r.to_string(),
            Self::Resource(r) => r.to_string(),
            Self::Integrity(r) => r.to_string(),
            Self::Unrecoverable(r) => r.to_string(),
            Self::Domain(e) => e.to_string(),
        }
    }

    /// Whether this error is terminal for the whole campaign, not just the
    /// current tier (`IntegrityError` and `Unrecoverable` per spec section 7).
    pub fn is_campaign_fatal(&self) -> bool {
        matches!(self, Self::Integrity(_) | Self::Unrecoverable(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
