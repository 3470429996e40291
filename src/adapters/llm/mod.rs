//! LLM Handler adapters (C2). No concrete production provider lives here —
//! only the deterministic test double this crate's own suite drives
//! against scenarios S1–S6.

pub mod scripted;

pub use scripted::{ScriptedLlmHandler, ScriptedResponse};
