//! Pipeline type definitions.

use chrono::{DateTime, Utc};
use quorum_knowledge::ScoredChunk;
use serde::{Deserialize, Serialize};

/// A registered agent: identity plus the behavioral prompt that shapes
/// its answers. Each agent owns exactly one knowledge partition, keyed by
/// its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-text description, used for routing
    pub description: String,

    /// Generated system prompt for this agent
    pub behavioral_prompt: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AgentProfile {
    /// Create a profile with a fresh id and creation timestamp.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        behavioral_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            behavioral_prompt: behavioral_prompt.into(),
            created_at: Utc::now(),
        }
    }
}

/// A user question entering the pipeline. Immutable once issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    /// Question text
    pub text: String,

    /// Caller role, used for context
    pub role: String,

    /// Optional session identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl UserQuery {
    /// Create a query with the default role.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: "employee".to_string(),
            session_id: None,
        }
    }

    /// Set the caller role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the session identifier.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// The dispatcher's verdict: which agent handles the query and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Chosen agent id; always a member of the candidate set
    pub agent_id: String,

    /// Chosen agent name
    pub agent_name: String,

    /// Free-text justification
    pub reasoning: String,

    /// Advisory confidence in [0, 1]
    pub confidence: f32,
}

impl RoutingDecision {
    /// Clamp the confidence into [0, 1].
    pub fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }
}

/// A specialist's grounded answer.
#[derive(Debug, Clone)]
pub struct AgentAnswer {
    /// Answer text
    pub answer: String,

    /// Evidence the generation context was built from, ordered by
    /// descending similarity
    pub evidence: Vec<ScoredChunk>,

    /// Unique source filenames present in the evidence, in retrieval order
    pub sources: Vec<String>,

    /// Name of the producing agent
    pub agent_name: String,
}

/// The auditor's verdict over a specialist's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOutcome {
    /// Whether the answer is safe to deliver as-is
    pub is_safe: bool,

    /// Free-text feedback from the audit
    pub feedback: String,

    /// The answer to deliver; may be a rewrite of the original
    pub final_answer: String,

    /// Tone score in [0, 1]
    pub politeness: f32,

    /// Consistency/plausibility score in [0, 1]
    pub correctness: f32,

    /// Support score in [0, 1]
    pub confidence: f32,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Selecting the agent for a query
    Routing,
    /// Retrieving evidence and generating the answer
    Generation,
    /// Scoring and possibly rewriting the answer
    Audit,
}

impl Stage {
    /// Stable lowercase name, used in logs and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Routing => "routing",
            Stage::Generation => "generation",
            Stage::Audit => "audit",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock duration of each stage, in milliseconds.
///
/// Informational only; never alters control flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings {
    pub routing_ms: u64,
    pub generation_ms: u64,
    pub audit_ms: u64,
}

/// The composed terminal outcome of one successful query.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The audited answer delivered to the caller
    pub answer: String,

    /// Unique source filenames backing the answer
    pub sources: Vec<String>,

    /// Name of the agent that produced the answer
    pub agent_name: String,

    /// The routing decision that selected the agent
    pub routing: RoutingDecision,

    /// The audit verdict
    pub audit: AuditOutcome,

    /// Per-stage elapsed time
    pub timings: StageTimings,
}
