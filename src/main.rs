//! `praxis` CLI entry point.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use praxis_core::adapters::health::StaticHealthProbe;
use praxis_core::adapters::llm::{ScriptedLlmHandler, ScriptedResponse};
use praxis_core::adapters::memory::SqliteMemory;
use praxis_core::cli::output::{format_campaign_view, format_event};
use praxis_core::cli::{Cli, Commands};
use praxis_core::domain::models::{SystemHealth, ToolDescriptor, ToolResult};
use praxis_core::domain::ports::tool_registry::{InvocationContext, Tool};
use praxis_core::infrastructure::config::ConfigLoader;
use praxis_core::infrastructure::logging;
use praxis_core::services::{AgentFactory, InMemoryAgentRegistry, InMemoryBeliefStore, InMemoryToolRegistry, Secp256k1IdentityManager};
use praxis_core::{CampaignView, Mastermind, SubmitOptions};

/// A no-op echo tool so a freshly wired process has at least one resolvable
/// tool to plan against; concrete tool implementations are out of scope for
/// this crate (spec section 1) and are registered by the embedding process
/// in a real deployment.
struct EchoTool(ToolDescriptor);

impl EchoTool {
    fn new() -> Self {
        Self(ToolDescriptor::new("echo", "1").with_capability("text"))
    }
}

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.0
    }

    async fn execute(&self, params: HashMap<String, serde_json::Value>, _context: InvocationContext) -> ToolResult {
        ToolResult::success(params.get("text").cloned().unwrap_or(serde_json::Value::Null))
    }
}

/// A capability-`research` tool so AGInt's `RESEARCH` act has something to
/// invoke out of the box.
struct NoteTool(ToolDescriptor);

impl NoteTool {
    fn new() -> Self {
        Self(ToolDescriptor::new("research_note", "1").with_capability("research"))
    }
}

#[async_trait::async_trait]
impl Tool for NoteTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.0
    }

    async fn execute(&self, _params: HashMap<String, serde_json::Value>, _context: InvocationContext) -> ToolResult {
        ToolResult::success(serde_json::json!({ "note": "no external research backend configured" }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path).context("failed to load configuration file")?,
        None => ConfigLoader::load().context("failed to load configuration")?,
    };

    let _guard = logging::init(&config.logging).context("failed to initialize logging")?;

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
    }
    let memory = Arc::new(
        SqliteMemory::connect(&format!("sqlite://{}", config.database.path))
            .await
            .context("failed to open memory store")?,
    );
    let beliefs = Arc::new(InMemoryBeliefStore::default());
    let tools = Arc::new(InMemoryToolRegistry::default());
    tools.register(Arc::new(EchoTool::new())).await.context("failed to register echo tool")?;
    tools.register(Arc::new(NoteTool::new())).await.context("failed to register research_note tool")?;
    let identity = Arc::new(Secp256k1IdentityManager::default());
    let agent_registry = Arc::new(InMemoryAgentRegistry::default());
    let agent_factory = Arc::new(AgentFactory::new(identity, tools.clone(), memory.clone(), agent_registry));
    let health = Arc::new(StaticHealthProbe(SystemHealth::Healthy));
    let llm = Arc::new(ScriptedLlmHandler::constant(
        "default",
        r#"[{"type":"echo","params":{"text":"no planning backend configured"}}]"#,
    ));

    let mastermind = Mastermind::new(llm, health, tools, beliefs, memory, agent_factory, config);
    let recovered = mastermind.recover_unfinished().await;
    for campaign_id in recovered {
        tracing::info!(%campaign_id, "recovered unfinished campaign as pending");
    }

    match cli.command {
        Commands::Submit { directive, max_cycles, model } => {
            let options = SubmitOptions { max_cycles, model_preference: model };
            let campaign_id = mastermind.submit(&directive, options).await.context("submit failed")?;
            println!("{} {campaign_id}", style("campaign:").bold());

            let mut events = mastermind.subscribe(campaign_id).await.context("subscribe failed")?;
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let terminal = matches!(
                            event.kind,
                            praxis_core::domain::models::EventKind::Complete | praxis_core::domain::models::EventKind::Error
                        );
                        println!("{}", format_event(&event));
                        if terminal {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }

            let view = mastermind.status(campaign_id).await.context("status failed")?;
            print_final(&view);
        }
        Commands::Status { campaign_id } => {
            let view = mastermind.status(campaign_id).await.context("status failed")?;
            print_final(&view);
        }
        Commands::Cancel { campaign_id } => {
            mastermind.cancel(campaign_id).await.context("cancel failed")?;
            println!("{}", style("cancellation requested").yellow());
        }
    }

    Ok(())
}

fn print_final(view: &CampaignView) {
    println!("{}", format_campaign_view(view));
    if view.state.is_terminal() {
        let line = if view.state == praxis_core::domain::models::CampaignStatus::Completed {
            style("campaign completed").green().to_string()
        } else {
            style(format!("campaign ended: {:?}", view.state)).red().to_string()
        };
        println!("{line}");
    }
}
