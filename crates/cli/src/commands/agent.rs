//! Agent management commands.

use crate::runtime::{build_llm_client, build_registry, build_store};
use clap::{Args, Subcommand};
use quorum_agents::{generate_profile, AgentProfile, AgentRegistry};
use quorum_core::{config::AppConfig, AppError, AppResult};

/// Manage knowledge agents
#[derive(Args, Debug)]
pub struct AgentCommand {
    #[command(subcommand)]
    command: AgentSubcommand,
}

#[derive(Subcommand, Debug)]
enum AgentSubcommand {
    /// Create an agent with a generated behavioral prompt
    Create {
        /// Agent display name
        #[arg(long)]
        name: String,

        /// What the agent is responsible for
        #[arg(long)]
        description: String,

        /// Use this behavioral prompt verbatim instead of generating one
        #[arg(long)]
        prompt: Option<String>,
    },

    /// List registered agents
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an agent and its entire knowledge partition
    Delete {
        /// Agent id
        id: String,
    },
}

impl AgentCommand {
    /// Execute the agent command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let registry = build_registry(config)?;

        match &self.command {
            AgentSubcommand::Create {
                name,
                description,
                prompt,
            } => {
                let (behavioral_prompt, routing_description) = match prompt {
                    Some(prompt) => (prompt.clone(), description.clone()),
                    None => {
                        let client = build_llm_client(config)?;
                        let generated = generate_profile(
                            client.as_ref(),
                            &config.model,
                            &config.workspace,
                            name,
                            description,
                        )
                        .await?;
                        (generated.behavioral_prompt, generated.refined_description)
                    }
                };

                let profile = AgentProfile::new(name, routing_description, behavioral_prompt);
                registry.create_agent(&profile).await?;

                println!("Created agent '{}' ({})", profile.name, profile.id);
                println!("Description: {}", profile.description);
                Ok(())
            }

            AgentSubcommand::List { json } => {
                let agents = registry.list_agents().await?;

                if *json {
                    let output = serde_json::to_string_pretty(&agents)
                        .map_err(|e| AppError::Serialization(e.to_string()))?;
                    println!("{}", output);
                } else if agents.is_empty() {
                    println!("No agents registered. Create one with 'quorum agent create'.");
                } else {
                    for agent in agents {
                        println!("{}  {}  - {}", agent.id, agent.name, agent.description);
                    }
                }
                Ok(())
            }

            AgentSubcommand::Delete { id } => {
                let existed = registry.delete_agent(id).await?;
                if !existed {
                    return Err(AppError::Registry(format!("No agent with id '{}'", id)));
                }

                // Cascade: the agent's partition goes with it
                let store = build_store(config)?;
                let removed = store.delete_partition(id)?;

                println!("Deleted agent '{}' and {} indexed chunks", id, removed);
                Ok(())
            }
        }
    }
}
