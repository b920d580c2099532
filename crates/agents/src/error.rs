//! Pipeline error taxonomy.
//!
//! Two categories exist: an empty registry (the only unconditionally
//! fatal condition, since there is no agent to route to) and a tagged stage
//! failure carrying the stage name plus the underlying cause so callers
//! can decide retry vs. report. Retry never happens inside the pipeline.

use crate::types::Stage;
use quorum_core::AppError;
use thiserror::Error;

/// Terminal failure of a single query.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No agents are registered; the query cannot be routed.
    #[error("No agents are available to handle this query")]
    NoAgentsAvailable,

    /// A stage failed: service outage, malformed structured output,
    /// or any other unexpected error.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: AppError,
    },
}

impl PipelineError {
    /// Wrap an application error as a failure of the given stage.
    pub fn at_stage(stage: Stage, source: AppError) -> Self {
        Self::Stage { stage, source }
    }

    /// The stage this error occurred in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::NoAgentsAvailable => None,
            Self::Stage { stage, .. } => Some(*stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_message_names_stage() {
        let err = PipelineError::at_stage(
            Stage::Generation,
            AppError::Llm("connection refused".to_string()),
        );
        let message = err.to_string();
        assert!(message.contains("generation"));
        assert!(err.stage() == Some(Stage::Generation));
    }

    #[test]
    fn test_no_agents_has_no_stage() {
        assert!(PipelineError::NoAgentsAvailable.stage().is_none());
    }
}
