//! Hierarchical configuration loading, grounded in the teacher's
//! `infrastructure/config/loader.rs`: defaults merged under a project file
//! merged under environment variables, highest precedence last.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    #[error("invalid max_cycles: {0}, must be at least 1")]
    InvalidMaxCycles(u32),

    #[error("cooldown_base_ms ({0}) must be less than cooldown_cap_ms ({1})")]
    InvalidCooldown(u64, u64),
}

/// Loads process-level configuration (spec section 6's recognized keys).
///
/// Precedence (lowest to highest):
/// 1. Programmatic defaults (`Config::default`).
/// 2. `praxis.yaml` in the working directory.
/// 3. Environment variables prefixed `PRAXIS_`, `__`-delimited for nested
///    keys (e.g. `PRAXIS_MODEL_SELECTION_WEIGHTS__CAPABILITY`).
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("praxis.yaml"))
            .merge(Env::prefixed("PRAXIS_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("PRAXIS_").split("__"))
            .extract()?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_cycles == 0 {
            return Err(ConfigError::InvalidMaxCycles(config.max_cycles));
        }
        if config.cooldown_base_ms >= config.cooldown_cap_ms {
            return Err(ConfigError::InvalidCooldown(config.cooldown_base_ms, config.cooldown_cap_ms));
        }
        Ok(())
    }
}
