//! End-to-end query orchestration.
//!
//! Runs the three stages strictly sequentially (route, retrieve-and-
//! generate, audit) and converts whatever happens into a single terminal
//! outcome. Per-stage wall-clock time is measured for reporting and never
//! alters control flow. A stage failure aborts the remaining stages of
//! this query only; there is no automatic retry here.

use crate::auditor::Auditor;
use crate::dispatcher::Dispatcher;
use crate::error::PipelineError;
use crate::observer::{StageObserver, TracingObserver};
use crate::specialist::Specialist;
use crate::types::{PipelineOutcome, Stage, StageTimings, UserQuery};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sequences the pipeline for one query at a time.
pub struct Coordinator {
    dispatcher: Dispatcher,
    specialist: Specialist,
    auditor: Auditor,
    observers: Vec<Arc<dyn StageObserver>>,
}

impl Coordinator {
    /// Create a coordinator with the default tracing observer.
    pub fn new(dispatcher: Dispatcher, specialist: Specialist, auditor: Auditor) -> Self {
        Self {
            dispatcher,
            specialist,
            auditor,
            observers: vec![Arc::new(TracingObserver)],
        }
    }

    /// Attach an additional stage observer.
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Process one query end to end.
    pub async fn process_query(
        &self,
        query: UserQuery,
    ) -> Result<PipelineOutcome, PipelineError> {
        tracing::info!("Processing query: {}", query.text);
        let mut timings = StageTimings::default();

        // Stage 1: routing. An empty registry is the one unconditionally
        // fatal condition; it arrives here already typed.
        self.notify_start(Stage::Routing, &query.text);
        let started = Instant::now();
        let routed = self.dispatcher.route(&query).await;
        let elapsed = started.elapsed();
        timings.routing_ms = elapsed.as_millis() as u64;

        let (routing, agent) = match routed {
            Ok(routed) => {
                self.notify_end(
                    Stage::Routing,
                    elapsed,
                    &format!("routed to '{}'", routed.0.agent_name),
                );
                routed
            }
            Err(e) => {
                self.notify_end(Stage::Routing, elapsed, &format!("failed: {}", e));
                return Err(e);
            }
        };

        // Stage 2: retrieval and generation.
        self.notify_start(Stage::Generation, &agent.name);
        let started = Instant::now();
        let answered = self.specialist.answer(&query, &agent).await;
        let elapsed = started.elapsed();
        timings.generation_ms = elapsed.as_millis() as u64;

        let answer = match answered {
            Ok(answer) => {
                self.notify_end(
                    Stage::Generation,
                    elapsed,
                    &format!("{} evidence chunks", answer.evidence.len()),
                );
                answer
            }
            Err(e) => {
                self.notify_end(Stage::Generation, elapsed, &format!("failed: {}", e));
                return Err(PipelineError::at_stage(Stage::Generation, e));
            }
        };

        // Stage 3: audit. The verdict annotates rather than blocks: even a
        // flagged answer is delivered in its rewritten form.
        self.notify_start(Stage::Audit, &answer.agent_name);
        let started = Instant::now();
        let audited = self.auditor.audit(&query, &answer).await;
        let elapsed = started.elapsed();
        timings.audit_ms = elapsed.as_millis() as u64;

        let audit = match audited {
            Ok(audit) => {
                self.notify_end(
                    Stage::Audit,
                    elapsed,
                    if audit.is_safe { "passed" } else { "flagged" },
                );
                audit
            }
            Err(e) => {
                self.notify_end(Stage::Audit, elapsed, &format!("failed: {}", e));
                return Err(PipelineError::at_stage(Stage::Audit, e));
            }
        };

        Ok(PipelineOutcome {
            answer: audit.final_answer.clone(),
            sources: answer.sources,
            agent_name: answer.agent_name,
            routing,
            audit,
            timings,
        })
    }

    fn notify_start(&self, stage: Stage, summary: &str) {
        for observer in &self.observers {
            observer.on_stage_start(stage, summary);
        }
    }

    fn notify_end(&self, stage: Stage, duration: Duration, summary: &str) {
        for observer in &self.observers {
            observer.on_stage_end(stage, duration, summary);
        }
    }
}
