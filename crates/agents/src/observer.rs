//! Stage observation hooks.
//!
//! A pluggable interceptor invoked before and after every pipeline stage,
//! carrying the stage name, duration, and a short input/output summary.
//! Kept orthogonal to pipeline logic: observers cannot alter control flow.

use crate::types::Stage;
use std::time::Duration;

/// Observer of pipeline stage execution.
pub trait StageObserver: Send + Sync {
    /// Called immediately before a stage runs.
    fn on_stage_start(&self, stage: Stage, summary: &str);

    /// Called after a stage completes or fails.
    fn on_stage_end(&self, stage: Stage, duration: Duration, summary: &str);
}

/// Default observer emitting tracing events per stage.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_stage_start(&self, stage: Stage, summary: &str) {
        tracing::info!(stage = stage.as_str(), "Stage starting: {}", summary);
    }

    fn on_stage_end(&self, stage: Stage, duration: Duration, summary: &str) {
        tracing::info!(
            stage = stage.as_str(),
            elapsed_ms = duration.as_millis() as u64,
            "Stage finished: {}",
            summary
        );
    }
}
