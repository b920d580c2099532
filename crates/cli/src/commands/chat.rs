//! Chat command: one question through the full routed pipeline.

use crate::runtime::{build_llm_client, build_registry, build_store};
use clap::Args;
use quorum_agents::{Auditor, Coordinator, Dispatcher, Specialist, UserQuery};
use quorum_core::{config::AppConfig, AppError, AppResult};

/// Ask a question through the routed pipeline
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// The question to ask
    pub question: String,

    /// Caller role forwarded to the pipeline
    #[arg(long, default_value = "employee")]
    pub role: String,

    /// Optional session identifier
    #[arg(long)]
    pub session: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let client = build_llm_client(config)?;
        let store = build_store(config)?;
        let registry = build_registry(config)?;

        let dispatcher = Dispatcher::new(
            client.clone(),
            registry,
            &config.model,
            config.workspace.clone(),
        );
        let specialist = Specialist::new(
            client.clone(),
            store,
            &config.model,
            config.workspace.clone(),
            config.retrieval_top_k,
        );
        let auditor = Auditor::new(client, &config.model, config.workspace.clone());

        let coordinator = Coordinator::new(dispatcher, specialist, auditor);

        let mut query = UserQuery::new(&self.question).with_role(&self.role);
        if let Some(ref session) = self.session {
            query = query.with_session(session.clone());
        }

        let outcome = coordinator
            .process_query(query)
            .await
            .map_err(|e| AppError::Other(e.to_string()))?;

        if self.json {
            let output = serde_json::json!({
                "answer": outcome.answer,
                "sources": outcome.sources,
                "agent_name": outcome.agent_name,
                "audit": {
                    "is_safe": outcome.audit.is_safe,
                    "politeness": outcome.audit.politeness,
                    "correctness": outcome.audit.correctness,
                    "confidence": outcome.audit.confidence,
                },
                "stage_durations": {
                    "routing": outcome.timings.routing_ms,
                    "generation": outcome.timings.generation_ms,
                    "audit": outcome.timings.audit_ms,
                },
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", outcome.answer);
            println!();
            println!(
                "Answered by {} (routing confidence {:.2})",
                outcome.agent_name, outcome.routing.confidence
            );

            if !outcome.sources.is_empty() {
                println!("Sources: {}", outcome.sources.join(", "));
            }

            if !outcome.audit.is_safe {
                println!("Audit note: {}", outcome.audit.feedback);
            }

            tracing::debug!(
                "Stage timings: routing {}ms, generation {}ms, audit {}ms",
                outcome.timings.routing_ms,
                outcome.timings.generation_ms,
                outcome.timings.audit_ms
            );
        }

        Ok(())
    }
}
