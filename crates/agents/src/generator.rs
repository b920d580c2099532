//! Agent profile generation.
//!
//! Turns a user-supplied agent name and free-text description into a
//! behavioral system prompt and a refined description suitable for the
//! routing layer. Runs once at agent creation time.

use quorum_core::AppResult;
use quorum_llm::{complete_structured, LlmClient, LlmRequest};
use quorum_prompt::AGENT_GENERATOR_ID;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Generated prompt and refined description for a new agent.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedProfile {
    /// System prompt establishing the agent's domain and tone
    pub behavioral_prompt: String,

    /// Cleaned-up description used for routing
    pub refined_description: String,
}

/// Generate a behavioral prompt and refined description for an agent.
pub async fn generate_profile(
    client: &dyn LlmClient,
    model: &str,
    workspace: &Path,
    agent_name: &str,
    description: &str,
) -> AppResult<GeneratedProfile> {
    let mut variables = HashMap::new();
    variables.insert("agent_name".to_string(), agent_name.to_string());
    variables.insert("description".to_string(), description.to_string());

    let prompt = quorum_prompt::render(workspace, AGENT_GENERATOR_ID, &variables)?;

    // Some creative range is wanted here, unlike the routing and audit calls
    let request = LlmRequest::new(prompt, model).with_temperature(0.7);

    let profile: GeneratedProfile = complete_structured(client, &request).await?;

    tracing::info!("Generated profile for agent '{}'", agent_name);
    Ok(profile)
}
