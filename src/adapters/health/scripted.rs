//! `HealthProbe` test doubles, mirroring `ScriptedLlmHandler`'s
//! replay-then-repeat-last shape so scenario tests can script a health
//! sequence (e.g. S4's overloaded-then-healthy transition) deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::models::SystemHealth;
use crate::services::agint::HealthProbe;

/// Always reports the same health.
pub struct StaticHealthProbe(pub SystemHealth);

#[async_trait]
impl HealthProbe for StaticHealthProbe {
    async fn system_health(&self) -> SystemHealth {
        self.0
    }
}

/// Replays a fixed sequence of readings in call order; the last entry
/// repeats once exhausted.
pub struct ScriptedHealthProbe {
    sequence: Vec<SystemHealth>,
    calls: AtomicUsize,
}

impl ScriptedHealthProbe {
    pub fn new(sequence: Vec<SystemHealth>) -> Self {
        Self { sequence, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl HealthProbe for ScriptedHealthProbe {
    async fn system_health(&self) -> SystemHealth {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.sequence.get(index).or_else(|| self.sequence.last()).copied().unwrap_or(SystemHealth::Healthy)
    }
}
