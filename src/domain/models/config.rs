//! Process-level configuration (spec section 6's recognized keys).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weights for AGInt's model-selection scoring function (spec section 4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelSelectionWeights {
    #[serde(default = "default_weight")]
    pub capability: f64,
    #[serde(default = "default_weight")]
    pub success: f64,
    #[serde(default = "default_weight")]
    pub latency: f64,
    #[serde(default = "default_weight")]
    pub cost: f64,
}

const fn default_weight() -> f64 {
    0.25
}

impl Default for ModelSelectionWeights {
    fn default() -> Self {
        Self {
            capability: default_weight(),
            success: default_weight(),
            latency: default_weight(),
            cost: default_weight(),
        }
    }
}

/// Database configuration for the append-only event log / campaign store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".praxis/praxis.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Process-level configuration, merged defaults -> YAML -> env (`PRAXIS_` prefix).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_provider")]
    pub default_provider: String,

    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,
    #[serde(default = "default_cycle_timeout_ms")]
    pub cycle_timeout_ms: u64,
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,

    #[serde(default = "default_cooldown_base_ms")]
    pub cooldown_base_ms: u64,
    #[serde(default = "default_cooldown_cap_ms")]
    pub cooldown_cap_ms: u64,

    #[serde(default)]
    pub model_selection_weights: ModelSelectionWeights,

    #[serde(default)]
    pub critical_components: Vec<String>,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_model() -> String {
    "scripted".to_string()
}

fn default_provider() -> String {
    "scripted".to_string()
}

const fn default_max_cycles() -> u32 {
    100
}

const fn default_cycle_timeout_ms() -> u64 {
    30_000
}

const fn default_tool_timeout_ms() -> u64 {
    15_000
}

const fn default_cooldown_base_ms() -> u64 {
    500
}

const fn default_cooldown_cap_ms() -> u64 {
    60_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            default_provider: default_provider(),
            max_cycles: default_max_cycles(),
            cycle_timeout_ms: default_cycle_timeout_ms(),
            tool_timeout_ms: default_tool_timeout_ms(),
            cooldown_base_ms: default_cooldown_base_ms(),
            cooldown_cap_ms: default_cooldown_cap_ms(),
            model_selection_weights: ModelSelectionWeights::default(),
            critical_components: Vec::new(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// `critical_components` are treated as non-mutable by self-repair
    /// (spec section 6).
    pub fn is_critical(&self, component: &str) -> bool {
        self.critical_components.iter().any(|c| c == component)
    }
}

/// Scored candidate model for AGInt's selection hook (spec section 4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub name: String,
    pub provider: String,
    pub capability_match: f64,
    pub recent_success_rate: f64,
    pub latency_ms: f64,
    pub cost_per_1k: f64,
}

impl ModelCandidate {
    pub fn score(&self, weights: &ModelSelectionWeights) -> f64 {
        let latency_term = if self.latency_ms > 0.0 { 1.0 / self.latency_ms } else { 0.0 };
        let cost_term = if self.cost_per_1k > 0.0 { 1.0 / self.cost_per_1k } else { 0.0 };
        weights.capability * self.capability_match
            + weights.success * self.recent_success_rate
            + weights.latency * latency_term
            + weights.cost * cost_term
    }
}

/// Select the best-scoring model; ties break by provider name then model
/// name, lexicographically (spec section 4.5).
pub fn select_model<'a>(candidates: &'a [ModelCandidate], weights: &ModelSelectionWeights) -> Option<&'a ModelCandidate> {
    candidates.iter().max_by(|a, b| {
        a.score(weights)
            .partial_cmp(&b.score(weights))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.provider.cmp(&b.provider))
            .then_with(|| a.name.cmp(&b.name))
    })
}

/// Options a plan action's `CREATE_AGENT` payload or a memory query may carry;
/// kept generic via `serde_json::Value` elsewhere, but typed here for the
/// handful of call sites that benefit from it.
pub type Extra = HashMap<String, serde_json::Value>;
