//! Grounded answer generation.
//!
//! For a single (query, agent) pair: retrieve supporting chunks from the
//! agent's knowledge partition, compose a generation request from the
//! agent's behavioral prompt plus the evidence, and return an answer with
//! source attribution. Zero retrieved chunks is a valid state: the
//! specialist still answers, grounded only in the agent's prompt.

use crate::types::{AgentAnswer, AgentProfile, UserQuery};
use quorum_core::AppResult;
use quorum_knowledge::{KnowledgeStore, ScoredChunk};
use quorum_llm::{LlmClient, LlmRequest};
use quorum_prompt::SPECIALIST_CONTEXT_ID;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Default system prompt when an agent has no behavioral prompt.
const FALLBACK_BEHAVIORAL_PROMPT: &str = "You are a helpful assistant.";

/// Produces grounded answers for routed queries.
pub struct Specialist {
    client: Arc<dyn LlmClient>,
    store: Arc<KnowledgeStore>,
    model: String,
    workspace: PathBuf,
    top_k: usize,
}

impl Specialist {
    /// Create a specialist.
    pub fn new(
        client: Arc<dyn LlmClient>,
        store: Arc<KnowledgeStore>,
        model: impl Into<String>,
        workspace: impl Into<PathBuf>,
        top_k: usize,
    ) -> Self {
        Self {
            client,
            store,
            model: model.into(),
            workspace: workspace.into(),
            top_k,
        }
    }

    /// Answer a query as the given agent.
    pub async fn answer(&self, query: &UserQuery, agent: &AgentProfile) -> AppResult<AgentAnswer> {
        let evidence = self
            .store
            .retrieve(&agent.id, &query.text, self.top_k)
            .await?;

        if evidence.is_empty() {
            tracing::info!(
                "No evidence found for '{}'; answering from the agent prompt alone",
                agent.name
            );
        }

        let context = build_context(&evidence);

        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.text.clone());
        variables.insert("context".to_string(), context);

        let user_prompt = quorum_prompt::render(&self.workspace, SPECIALIST_CONTEXT_ID, &variables)?;

        let system = if agent.behavioral_prompt.trim().is_empty() {
            FALLBACK_BEHAVIORAL_PROMPT.to_string()
        } else {
            agent.behavioral_prompt.clone()
        };

        let request = LlmRequest::new(user_prompt, &self.model)
            .with_system(system)
            .with_temperature(0.0)
            .with_max_tokens(1000);

        let response = self.client.complete(&request).await?;

        // Attribution lists only filenames actually present in the chunks
        // the generation context was built from
        let sources = unique_sources(&evidence);

        tracing::info!(
            "'{}' answered with {} evidence chunks from {} sources",
            agent.name,
            evidence.len(),
            sources.len()
        );

        Ok(AgentAnswer {
            answer: response.content,
            evidence,
            sources,
            agent_name: agent.name.clone(),
        })
    }
}

/// Render evidence chunks into the generation context.
fn build_context(evidence: &[ScoredChunk]) -> String {
    evidence
        .iter()
        .map(|scored| {
            format!(
                "[Source: {}]\n{}",
                scored.chunk.source_filename, scored.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Unique source filenames in retrieval order.
fn unique_sources(evidence: &[ScoredChunk]) -> Vec<String> {
    let mut sources = Vec::new();
    for scored in evidence {
        if !sources.contains(&scored.chunk.source_filename) {
            sources.push(scored.chunk.source_filename.clone());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_knowledge::embeddings::providers::mock::MockEmbedder;
    use quorum_knowledge::StoreSettings;
    use quorum_llm::ScriptedClient;

    fn hr_agent() -> AgentProfile {
        AgentProfile {
            id: "agent-hr".to_string(),
            name: "HR Specialist".to_string(),
            description: "Handles leave, harassment, and benefits questions".to_string(),
            behavioral_prompt: "You are an HR assistant. Ground answers in the material provided."
                .to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    fn test_store() -> Arc<KnowledgeStore> {
        let embedder = Arc::new(MockEmbedder::new(384));
        Arc::new(KnowledgeStore::in_memory(embedder, StoreSettings::default()).unwrap())
    }

    fn specialist_with(
        store: Arc<KnowledgeStore>,
        responses: Vec<String>,
    ) -> (Specialist, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(responses));
        let specialist = Specialist::new(
            client.clone(),
            store,
            "test-model",
            std::env::temp_dir(),
            4,
        );
        (specialist, client)
    }

    #[tokio::test]
    async fn test_answer_with_evidence() {
        let store = test_store();
        store
            .ingest(
                "agent-hr",
                "doc-1",
                "Harassment should be reported to the human resources team immediately. \
                 Reports are confidential.",
                "hr_handbook.txt",
            )
            .await
            .unwrap();

        let (specialist, client) =
            specialist_with(store, vec!["Report it to the HR team.".to_string()]);

        let answer = specialist
            .answer(&UserQuery::new("How do I report harassment?"), &hr_agent())
            .await
            .unwrap();

        assert_eq!(answer.answer, "Report it to the HR team.");
        assert_eq!(answer.sources, vec!["hr_handbook.txt".to_string()]);
        assert_eq!(answer.agent_name, "HR Specialist");
        assert!(!answer.evidence.is_empty());

        // The generation request carried the behavioral prompt and the
        // evidence text
        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .system
            .as_deref()
            .unwrap()
            .contains("HR assistant"));
        assert!(requests[0].prompt.contains("hr_handbook.txt"));
        assert!(requests[0].prompt.contains("How do I report harassment?"));
    }

    #[tokio::test]
    async fn test_answer_with_empty_partition() {
        // Absence of evidence is not an error: the specialist still answers
        let store = test_store();
        let (specialist, client) = specialist_with(
            store,
            vec!["I don't have documentation on that, but generally...".to_string()],
        );

        let answer = specialist
            .answer(&UserQuery::new("How do I report harassment?"), &hr_agent())
            .await
            .unwrap();

        assert!(!answer.answer.is_empty());
        assert!(answer.sources.is_empty());
        assert!(answer.evidence.is_empty());

        // With no evidence the prompt must not claim reference material
        let requests = client.recorded_requests();
        assert!(!requests[0].prompt.contains("Reference material"));
    }

    #[tokio::test]
    async fn test_answer_fallback_prompt_for_blank_agent() {
        let store = test_store();
        let (specialist, client) = specialist_with(store, vec!["ok".to_string()]);

        let mut agent = hr_agent();
        agent.behavioral_prompt = "  ".to_string();

        specialist
            .answer(&UserQuery::new("q"), &agent)
            .await
            .unwrap();

        let requests = client.recorded_requests();
        assert_eq!(
            requests[0].system.as_deref(),
            Some(FALLBACK_BEHAVIORAL_PROMPT)
        );
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let store = test_store();
        let (specialist, _) = specialist_with(store, vec![]);

        let result = specialist
            .answer(&UserQuery::new("q"), &hr_agent())
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_unique_sources_preserve_order() {
        use quorum_knowledge::StoredChunk;

        let chunk = |filename: &str| ScoredChunk {
            chunk: StoredChunk {
                id: "c".to_string(),
                agent_id: "a".to_string(),
                document_id: "d".to_string(),
                source_filename: filename.to_string(),
                position: 0,
                text: "t".to_string(),
                embedding: None,
            },
            score: 0.5,
        };

        let evidence = vec![chunk("b.txt"), chunk("a.txt"), chunk("b.txt")];
        assert_eq!(unique_sources(&evidence), vec!["b.txt", "a.txt"]);
    }
}
