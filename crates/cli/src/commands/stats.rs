//! Stats command: registry and store counts.

use crate::runtime::{build_registry, build_store};
use clap::Args;
use quorum_agents::AgentRegistry;
use quorum_core::{config::AppConfig, AppError, AppResult};

/// Show registry and store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let registry = build_registry(config)?;
        let store = build_store(config)?;

        let agents = registry.list_agents().await?;
        let stats = store.stats()?;

        if self.json {
            let output = serde_json::json!({
                "agents": agents.len(),
                "documents": stats.documents_count,
                "chunks": stats.chunks_count,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Agents:    {}", agents.len());
            println!("Documents: {}", stats.documents_count);
            println!("Chunks:    {}", stats.chunks_count);

            for agent in agents {
                let documents = store.documents(&agent.id)?;
                println!(
                    "  {}  {} documents",
                    agent.name,
                    documents.len()
                );
            }
        }

        Ok(())
    }
}
