//! System health probe adapters for AGInt's Perceive phase (C7).

pub mod scripted;

pub use scripted::{ScriptedHealthProbe, StaticHealthProbe};
