//! Ambient process infrastructure: configuration loading and logging
//! setup. Neither is part of the cognitive core's own API surface (spec
//! section 6); both are the scaffolding `main.rs` wires up before
//! constructing a `Mastermind`.

pub mod config;
pub mod logging;
