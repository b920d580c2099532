//! LLM provider abstraction for Quorum.
//!
//! Defines the `LlmClient` trait, concrete providers (Ollama, any
//! OpenAI-compatible endpoint, and a scripted client for tests), a
//! provider factory, and the structured output contract used by the
//! dispatcher and auditor.

pub mod client;
pub mod factory;
pub mod providers;
pub mod structured;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::scripted::ScriptedClient;
pub use structured::complete_structured;
