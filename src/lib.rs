//! praxis-core — the hierarchical cognitive agent scheduler.
//!
//! Three tiers drive a directive to completion: Mastermind (C8, strategic)
//! owns a campaign and its AGInt instance; AGInt (C7) runs the
//! Perceive-Orient-Decide-Act loop and delegates to BDI (C6) or triggers
//! self-repair/research/cooldown; BDI plans and executes tool invocations
//! against the Tool Registry (C5). Identity (C1), Belief Store (C3), Memory
//! (C4), and the LLM Handler interface (C2) are the leaf dependencies
//! everything above is built on; Agent Factory (C9) is invoked whenever a
//! plan creates a new agent.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{CoreError, CoreResult, DomainError, DomainResult};
pub use services::mastermind::{CampaignView, Mastermind, MastermindError, SubmitOptions};
