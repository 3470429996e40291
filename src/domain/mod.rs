//! Domain layer: models, ports, and the error taxonomy they share.
//!
//! Nothing in this module performs I/O; `services` and `adapters` depend on
//! it, never the reverse.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CoreError, CoreResult, DomainError, DomainResult};
