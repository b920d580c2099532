//! Prompt template system for Quorum.
//!
//! Every LLM-facing instruction lives here as a named Handlebars template.
//! Built-in templates ship with the binary; a workspace can override any of
//! them by dropping a file at `.quorum/prompts/<id>.md`.

pub mod builder;
pub mod loader;
pub mod templates;

pub use builder::{render, render_template};
pub use loader::{list_templates, load_template};
pub use templates::{AGENT_GENERATOR_ID, AUDITOR_ID, DISPATCHER_ID, SPECIALIST_CONTEXT_ID};
