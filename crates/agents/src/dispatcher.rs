//! Query routing.
//!
//! Maps a query to exactly one registered agent. The candidate set is
//! fetched fresh from the injected registry on every call; routing never
//! works from a cached view. An empty registry is the one fatal,
//! pipeline-stopping condition in the whole system.

use crate::error::PipelineError;
use crate::registry::AgentRegistry;
use crate::types::{AgentProfile, RoutingDecision, Stage, UserQuery};
use quorum_core::AppError;
use quorum_llm::{complete_structured, LlmClient, LlmRequest};
use quorum_prompt::DISPATCHER_ID;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Routes queries to agents.
pub struct Dispatcher {
    client: Arc<dyn LlmClient>,
    registry: Arc<dyn AgentRegistry>,
    model: String,
    workspace: PathBuf,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(
        client: Arc<dyn LlmClient>,
        registry: Arc<dyn AgentRegistry>,
        model: impl Into<String>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            registry,
            model: model.into(),
            workspace: workspace.into(),
        }
    }

    /// Route a query against the current registry contents.
    pub async fn route(
        &self,
        query: &UserQuery,
    ) -> Result<(RoutingDecision, AgentProfile), PipelineError> {
        let candidates = self
            .registry
            .list_agents()
            .await
            .map_err(|e| PipelineError::at_stage(Stage::Routing, e))?;

        self.route_among(query, &candidates).await
    }

    /// Route a query against an explicit candidate set.
    ///
    /// Always selects exactly one agent, even when none of the
    /// descriptions is a strong match; there is no "unroutable" outcome.
    /// Candidates are rendered in registry order and the decision is
    /// requested at temperature 0, so the tie-break is "earliest listed".
    pub async fn route_among(
        &self,
        query: &UserQuery,
        candidates: &[AgentProfile],
    ) -> Result<(RoutingDecision, AgentProfile), PipelineError> {
        if candidates.is_empty() {
            tracing::warn!("Routing requested with an empty agent registry");
            return Err(PipelineError::NoAgentsAvailable);
        }

        let agent_list = candidates
            .iter()
            .map(|a| format!("- id: {}, name: {}, description: {}", a.id, a.name, a.description))
            .collect::<Vec<_>>()
            .join("\n");

        let mut variables = HashMap::new();
        variables.insert("agent_list".to_string(), agent_list);
        variables.insert("query".to_string(), query.text.clone());

        let prompt = quorum_prompt::render(&self.workspace, DISPATCHER_ID, &variables)
            .map_err(|e| PipelineError::at_stage(Stage::Routing, e))?;

        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);

        let decision: RoutingDecision = complete_structured(self.client.as_ref(), &request)
            .await
            .map_err(|e| PipelineError::at_stage(Stage::Routing, e))?;
        let decision = decision.clamped();

        // The chosen agent must be a member of the candidate set. Repair by
        // exact id, then by case-insensitive name; anything else is
        // malformed structured output.
        let agent = candidates
            .iter()
            .find(|a| a.id == decision.agent_id)
            .or_else(|| {
                candidates
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(&decision.agent_name))
            })
            .ok_or_else(|| {
                PipelineError::at_stage(
                    Stage::Routing,
                    AppError::Llm(format!(
                        "Routing decision named an agent outside the candidate set: '{}' (id '{}')",
                        decision.agent_name, decision.agent_id
                    )),
                )
            })?;

        let decision = RoutingDecision {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            ..decision
        };

        tracing::info!(
            "Routed query to '{}' (confidence {:.2}): {}",
            decision.agent_name,
            decision.confidence,
            decision.reasoning
        );

        Ok((decision, agent.clone()))
    }
}
