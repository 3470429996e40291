//! `tracing`-based logging setup, grounded in the teacher's
//! `infrastructure/logging/logger.rs`: an `EnvFilter` seeded from the
//! configured level (overridable by `RUST_LOG`), JSON or pretty formatting
//! by config, stdout only — this crate writes no log files.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::domain::models::LoggingConfig;

/// Held by `main` for the process lifetime; dropping it would tear down
/// any buffered writer, though this crate's stdout-only setup has none.
pub struct LoggerGuard;

/// Initializes the global `tracing` subscriber from `config`. Must be
/// called at most once per process.
pub fn init(config: &LoggingConfig) -> Result<LoggerGuard> {
    let level = parse_level(&config.level)?;
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .finish()
                .try_init()?;
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(env_filter)
                .with_target(true)
                .finish()
                .try_init()?;
        }
    }

    Ok(LoggerGuard)
}

fn parse_level(level: &str) -> Result<Level> {
    level
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("invalid log level: {level}, expected one of trace/debug/info/warn/error"))
}
