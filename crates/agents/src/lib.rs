//! The Quorum query pipeline.
//!
//! A query flows through four strictly sequential stages: the dispatcher
//! routes it to one agent, the specialist grounds an answer in that
//! agent's knowledge partition, the auditor scores (and may rewrite) the
//! answer, and the coordinator composes the terminal outcome. Each query
//! runs in its own pipeline instance; instances share only the agent
//! registry and the knowledge store.

pub mod auditor;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod observer;
pub mod registry;
pub mod specialist;
pub mod types;

pub use auditor::Auditor;
pub use coordinator::Coordinator;
pub use dispatcher::Dispatcher;
pub use error::PipelineError;
pub use generator::{generate_profile, GeneratedProfile};
pub use observer::{StageObserver, TracingObserver};
pub use registry::{AgentRegistry, InMemoryRegistry, SqliteRegistry};
pub use specialist::Specialist;
pub use types::{
    AgentAnswer, AgentProfile, AuditOutcome, PipelineOutcome, RoutingDecision, Stage,
    StageTimings, UserQuery,
};
