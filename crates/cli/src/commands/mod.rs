//! CLI command handlers.

mod agent;
mod chat;
mod doc;
mod stats;

pub use agent::AgentCommand;
pub use chat::ChatCommand;
pub use doc::DocCommand;
pub use stats::StatsCommand;
