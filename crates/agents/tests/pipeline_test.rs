//! End-to-end pipeline tests with a scripted LLM, an in-memory registry,
//! and an in-memory knowledge store.

use quorum_agents::{
    AgentProfile, Auditor, Coordinator, Dispatcher, InMemoryRegistry, PipelineError, Specialist,
    Stage, UserQuery,
};
use quorum_knowledge::embeddings::providers::mock::MockEmbedder;
use quorum_knowledge::{KnowledgeStore, StoreSettings};
use quorum_llm::ScriptedClient;
use std::sync::Arc;

const HR_TEXT: &str = "Employees accrue twenty days of paid vacation per year. \
    Harassment should be reported to the human resources team immediately; \
    reports are confidential. Health benefits enrollment opens every November.";

fn hr_agent() -> AgentProfile {
    AgentProfile {
        id: "agent-hr".to_string(),
        name: "HR Specialist".to_string(),
        description: "Handles leave, harassment, and benefits questions".to_string(),
        behavioral_prompt: "You are the HR Specialist. Ground answers in provided material."
            .to_string(),
        created_at: chrono::Utc::now(),
    }
}

fn tech_agent() -> AgentProfile {
    AgentProfile {
        id: "agent-tech".to_string(),
        name: "Tech Specialist".to_string(),
        description: "Handles infrastructure, keys, and deployment questions".to_string(),
        behavioral_prompt: "You are the Tech Specialist.".to_string(),
        created_at: chrono::Utc::now(),
    }
}

fn empty_store() -> Arc<KnowledgeStore> {
    let embedder = Arc::new(MockEmbedder::new(384));
    Arc::new(KnowledgeStore::in_memory(embedder, StoreSettings::default()).unwrap())
}

/// Assemble a full pipeline around one scripted client. Stages run
/// sequentially, so responses are consumed in stage order: routing,
/// generation, audit.
fn pipeline(
    responses: Vec<&str>,
    agents: Vec<AgentProfile>,
    store: Arc<KnowledgeStore>,
) -> (Coordinator, Arc<ScriptedClient>) {
    let client = Arc::new(ScriptedClient::new(
        responses.into_iter().map(String::from).collect(),
    ));
    let registry = Arc::new(InMemoryRegistry::with_agents(agents));
    let workspace = std::env::temp_dir();

    let dispatcher = Dispatcher::new(client.clone(), registry, "test-model", workspace.clone());
    let specialist = Specialist::new(client.clone(), store, "test-model", workspace.clone(), 4);
    let auditor = Auditor::new(client.clone(), "test-model", workspace);

    (Coordinator::new(dispatcher, specialist, auditor), client)
}

const ROUTE_TO_HR: &str = r#"{"agent_id": "agent-hr", "agent_name": "HR Specialist",
    "reasoning": "Harassment reporting is an HR matter.", "confidence": 0.93}"#;

const CLEAN_AUDIT: &str = r#"{"is_safe": true, "feedback": "Clear and professional.",
    "final_answer": "Report harassment to the HR team; reports stay confidential.",
    "politeness_score": 0.95, "correctness_score": 0.9, "confidence_score": 0.88}"#;

#[tokio::test]
async fn test_full_pipeline_happy_path() {
    let store = empty_store();
    store
        .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
        .await
        .unwrap();

    let (coordinator, _) = pipeline(
        vec![
            ROUTE_TO_HR,
            "Report harassment to the HR team; reports stay confidential.",
            CLEAN_AUDIT,
        ],
        vec![hr_agent(), tech_agent()],
        store,
    );

    let outcome = coordinator
        .process_query(UserQuery::new("How do I report harassment?"))
        .await
        .unwrap();

    assert_eq!(outcome.agent_name, "HR Specialist");
    assert_eq!(
        outcome.answer,
        "Report harassment to the HR team; reports stay confidential."
    );
    assert_eq!(outcome.sources, vec!["hr_handbook.txt".to_string()]);
    assert!(outcome.audit.is_safe);

    // Score bounds hold on every audited outcome
    for score in [
        outcome.audit.politeness,
        outcome.audit.correctness,
        outcome.audit.confidence,
    ] {
        assert!((0.0..=1.0).contains(&score));
    }

    // Routing scenario: confidence positive, reasoning references HR terms
    assert!(outcome.routing.confidence > 0.0);
    assert!(outcome.routing.reasoning.to_lowercase().contains("hr")
        || outcome.routing.reasoning.to_lowercase().contains("harassment"));
}

#[tokio::test]
async fn test_zero_agents_is_fatal_and_stops_the_pipeline() {
    let (coordinator, client) = pipeline(vec![], vec![], empty_store());

    let err = coordinator
        .process_query(UserQuery::new("How do I report harassment?"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoAgentsAvailable));
    // No stage after routing executed: the LLM was never called
    assert!(client.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_empty_partition_still_answers_with_no_sources() {
    let (coordinator, _) = pipeline(
        vec![
            ROUTE_TO_HR,
            "I don't have documentation on that, but HR can help directly.",
            r#"{"is_safe": true, "feedback": "ok", "final_answer": null,
                "politeness_score": 0.9, "correctness_score": 0.7, "confidence_score": 0.5}"#,
        ],
        vec![hr_agent()],
        empty_store(),
    );

    let outcome = coordinator
        .process_query(UserQuery::new("How do I report harassment?"))
        .await
        .unwrap();

    assert!(!outcome.answer.is_empty());
    assert!(outcome.sources.is_empty());
}

#[tokio::test]
async fn test_generation_failure_is_stage_tagged() {
    // Only the routing response is queued; the generation call fails
    let (coordinator, _) = pipeline(vec![ROUTE_TO_HR], vec![hr_agent()], empty_store());

    let err = coordinator
        .process_query(UserQuery::new("q"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Generation));
    assert!(err.to_string().contains("generation"));
}

#[tokio::test]
async fn test_malformed_audit_is_stage_tagged() {
    let (coordinator, _) = pipeline(
        vec![ROUTE_TO_HR, "an answer", "this is not the audit shape"],
        vec![hr_agent()],
        empty_store(),
    );

    let err = coordinator
        .process_query(UserQuery::new("q"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Audit));
}

#[tokio::test]
async fn test_flagged_audit_delivers_the_rewrite() {
    let (coordinator, _) = pipeline(
        vec![
            ROUTE_TO_HR,
            "Just deal with it.",
            r#"{"is_safe": false, "feedback": "Dismissive tone.",
                "final_answer": "I understand this is difficult. Please contact HR directly.",
                "politeness_score": 0.1, "correctness_score": 0.6, "confidence_score": 0.5}"#,
        ],
        vec![hr_agent()],
        empty_store(),
    );

    let outcome = coordinator
        .process_query(UserQuery::new("How do I report harassment?"))
        .await
        .unwrap();

    // The flagged answer is annotated and rewritten, not suppressed
    assert!(!outcome.audit.is_safe);
    assert_eq!(
        outcome.answer,
        "I understand this is difficult. Please contact HR directly."
    );
    assert_eq!(outcome.audit.feedback, "Dismissive tone.");
}

#[tokio::test]
async fn test_routing_membership_enforced_through_pipeline() {
    let (coordinator, _) = pipeline(
        vec![
            r#"{"agent_id": "agent-finance", "agent_name": "Finance Specialist",
                "reasoning": "r", "confidence": 0.9}"#,
        ],
        vec![hr_agent(), tech_agent()],
        empty_store(),
    );

    let err = coordinator
        .process_query(UserQuery::new("What is our travel budget?"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Routing));
}

#[tokio::test]
async fn test_concurrent_queries_are_independent() {
    let store = empty_store();
    store
        .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
        .await
        .unwrap();

    // Two pipelines sharing one store; one fails at generation, the
    // other completes. The failure must not disturb the survivor or the
    // store.
    let (failing, _) = pipeline(vec![ROUTE_TO_HR], vec![hr_agent()], store.clone());
    let (healthy, _) = pipeline(
        vec![ROUTE_TO_HR, "Use the HR process.", CLEAN_AUDIT],
        vec![hr_agent()],
        store.clone(),
    );

    let (failed, succeeded) = tokio::join!(
        failing.process_query(UserQuery::new("How do I report harassment?")),
        healthy.process_query(UserQuery::new("How do I report harassment?")),
    );

    assert!(failed.is_err());
    let outcome = succeeded.unwrap();
    assert_eq!(outcome.agent_name, "HR Specialist");

    // Store state intact after the failed query
    assert_eq!(store.stats().unwrap().documents_count, 1);
}
