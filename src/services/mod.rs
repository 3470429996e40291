//! Application services: the business logic implementing each component's
//! operations over the domain models and ports.

pub mod agent_factory;
pub mod agint;
pub mod bdi;
pub mod belief_store;
pub mod identity_manager;
pub mod mastermind;
pub mod placeholder;
pub mod plan_parser;
pub mod tool_registry;

pub use agent_factory::{AgentCreationConfig, AgentFactory, AgentFactoryError, AgentRegistry, InMemoryAgentRegistry};
pub use agint::{AgintGovernor, AgintOutcome, HealthProbe, ProgressSink, TickReport};
pub use bdi::{BdiOutcome, BdiReasoner};
pub use belief_store::InMemoryBeliefStore;
pub use identity_manager::Secp256k1IdentityManager;
pub use mastermind::{CampaignView, Mastermind, MastermindError, SubmitOptions};
pub use tool_registry::InMemoryToolRegistry;
