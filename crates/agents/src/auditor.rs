//! Independent quality gate over a specialist's answer.
//!
//! Scores the answer on politeness, correctness, and confidence, decides
//! whether it is safe to deliver, and may substitute a rewritten answer.
//! It always returns a result; an answer is never silently dropped.
//! Scores are self-assessed by a generative judgment and are advisory,
//! not verified ground truth.

use crate::types::{AgentAnswer, AuditOutcome, UserQuery};
use quorum_core::AppResult;
use quorum_llm::{complete_structured, LlmClient, LlmRequest};
use quorum_prompt::AUDITOR_ID;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Wire shape of the auditor's structured reply.
#[derive(Debug, Deserialize)]
struct AuditReply {
    is_safe: bool,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    final_answer: Option<String>,
    politeness_score: f32,
    correctness_score: f32,
    confidence_score: f32,
}

/// Audits specialist answers before they reach the caller.
pub struct Auditor {
    client: Arc<dyn LlmClient>,
    model: String,
    workspace: PathBuf,
}

impl Auditor {
    /// Create an auditor.
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            workspace: workspace.into(),
        }
    }

    /// Audit an answer in the context of the query it responds to.
    pub async fn audit(&self, query: &UserQuery, answer: &AgentAnswer) -> AppResult<AuditOutcome> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.text.clone());
        variables.insert("answer".to_string(), answer.answer.clone());

        let prompt = quorum_prompt::render(&self.workspace, AUDITOR_ID, &variables)?;
        let request = LlmRequest::new(prompt, &self.model).with_temperature(0.0);

        let reply: AuditReply = complete_structured(self.client.as_ref(), &request).await?;

        // A missing rewrite means the draft stands
        let final_answer = reply
            .final_answer
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| answer.answer.clone());

        let outcome = AuditOutcome {
            is_safe: reply.is_safe,
            feedback: reply.feedback,
            final_answer,
            politeness: reply.politeness_score.clamp(0.0, 1.0),
            correctness: reply.correctness_score.clamp(0.0, 1.0),
            confidence: reply.confidence_score.clamp(0.0, 1.0),
        };

        if outcome.is_safe {
            tracing::info!(
                "Audit passed (politeness {:.2}, correctness {:.2}, confidence {:.2})",
                outcome.politeness,
                outcome.correctness,
                outcome.confidence
            );
        } else {
            tracing::warn!("Audit flagged the answer: {}", outcome.feedback);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_llm::ScriptedClient;

    fn sample_answer(text: &str) -> AgentAnswer {
        AgentAnswer {
            answer: text.to_string(),
            evidence: Vec::new(),
            sources: Vec::new(),
            agent_name: "HR Specialist".to_string(),
        }
    }

    fn auditor_with(responses: Vec<String>) -> Auditor {
        Auditor::new(
            Arc::new(ScriptedClient::new(responses)),
            "test-model",
            std::env::temp_dir(),
        )
    }

    #[tokio::test]
    async fn test_audit_passes_clean_answer() {
        let response = r#"{"is_safe": true, "feedback": "Clear and polite.",
            "final_answer": "Report it to the HR team.",
            "politeness_score": 0.95, "correctness_score": 0.9, "confidence_score": 0.85}"#;
        let auditor = auditor_with(vec![response.to_string()]);

        let outcome = auditor
            .audit(
                &UserQuery::new("How do I report harassment?"),
                &sample_answer("Report it to the HR team."),
            )
            .await
            .unwrap();

        assert!(outcome.is_safe);
        assert_eq!(outcome.final_answer, "Report it to the HR team.");
        for score in [outcome.politeness, outcome.correctness, outcome.confidence] {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[tokio::test]
    async fn test_audit_rewrites_unsafe_answer() {
        let response = r#"{"is_safe": false, "feedback": "Dismissive tone.",
            "final_answer": "I understand this is difficult. Please contact HR directly.",
            "politeness_score": 0.2, "correctness_score": 0.7, "confidence_score": 0.6}"#;
        let auditor = auditor_with(vec![response.to_string()]);

        let outcome = auditor
            .audit(
                &UserQuery::new("How do I report harassment?"),
                &sample_answer("Just deal with it."),
            )
            .await
            .unwrap();

        assert!(!outcome.is_safe);
        assert!(outcome.final_answer.contains("contact HR"));
        assert_eq!(outcome.feedback, "Dismissive tone.");
    }

    #[tokio::test]
    async fn test_missing_rewrite_falls_back_to_draft() {
        let response = r#"{"is_safe": true, "feedback": "",
            "politeness_score": 0.9, "correctness_score": 0.9, "confidence_score": 0.9}"#;
        let auditor = auditor_with(vec![response.to_string()]);

        let outcome = auditor
            .audit(&UserQuery::new("q"), &sample_answer("the draft"))
            .await
            .unwrap();
        assert_eq!(outcome.final_answer, "the draft");
    }

    #[tokio::test]
    async fn test_scores_clamped_to_unit_interval() {
        let response = r#"{"is_safe": true, "feedback": "f", "final_answer": "a",
            "politeness_score": 1.8, "correctness_score": -0.4, "confidence_score": 0.5}"#;
        let auditor = auditor_with(vec![response.to_string()]);

        let outcome = auditor
            .audit(&UserQuery::new("q"), &sample_answer("a"))
            .await
            .unwrap();
        assert_eq!(outcome.politeness, 1.0);
        assert_eq!(outcome.correctness, 0.0);
        assert_eq!(outcome.confidence, 0.5);
    }

    #[tokio::test]
    async fn test_malformed_audit_is_an_error() {
        // A reply that does not satisfy the declared shape must fail the
        // stage rather than produce a guessed verdict
        let auditor = auditor_with(vec!["looks fine to me".to_string()]);
        let result = auditor
            .audit(&UserQuery::new("q"), &sample_answer("a"))
            .await;
        assert!(result.is_err());
    }
}
