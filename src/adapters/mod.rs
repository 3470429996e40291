//! Adapters: concrete implementations of the domain ports that are in
//! scope for this crate's own use and test suite — a deterministic LLM
//! test double, scripted system-health probes, and the two `Memory`
//! backings (in-process, SQLite). Real production LLM providers and the
//! HTTP control plane are out of scope (spec section 1) and live outside
//! this crate.

pub mod health;
pub mod llm;
pub mod memory;
