//! Scripted LLM client for deterministic tests and offline development.
//!
//! Responses are queued up front and returned in order, one per
//! `complete` call. Every request is recorded so tests can assert on the
//! prompts the pipeline actually built.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use quorum_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Deterministic queue-backed LLM client.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    /// Create a client that replies with the given responses in order.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a client that always fails, simulating a service outage.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    /// Queue an additional response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("scripted client lock poisoned")
            .push_back(response.into());
    }

    /// All requests received so far, in call order.
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .expect("scripted client lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests
            .lock()
            .expect("scripted client lock poisoned")
            .push(request.clone());

        let next = self
            .responses
            .lock()
            .expect("scripted client lock poisoned")
            .pop_front();

        match next {
            Some(content) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            None => Err(AppError::Llm(
                "Scripted client has no response queued".to_string(),
            )),
        }
    }
}
