//! Structured output contract.
//!
//! Runs a completion and decodes the reply into a caller-declared type.
//! The reply either satisfies the declared shape or the call fails with a
//! parse error. There is no silent coercion and no partially-parsed
//! value. Models frequently wrap JSON in markdown code fences even when
//! told not to, so fences are stripped before decoding.

use crate::client::{LlmClient, LlmRequest};
use quorum_core::{AppError, AppResult};
use serde::de::DeserializeOwned;

/// Perform a completion and decode the response as JSON into `T`.
///
/// # Errors
/// Returns `AppError::Llm` if the underlying call fails or if the reply
/// cannot be decoded into `T`.
pub async fn complete_structured<T: DeserializeOwned>(
    client: &dyn LlmClient,
    request: &LlmRequest,
) -> AppResult<T> {
    let response = client.complete(request).await?;
    decode_structured(&response.content)
}

/// Decode a raw model reply into `T`, stripping markdown fences first.
pub fn decode_structured<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    let cleaned = strip_code_fences(raw);

    serde_json::from_str(&cleaned).map_err(|e| {
        let preview: String = cleaned.chars().take(200).collect();
        tracing::warn!(
            "Structured output did not match the expected shape: {}",
            preview
        );
        AppError::Llm(format!(
            "Structured output did not match the expected shape: {}",
            e
        ))
    })
}

/// Strip a surrounding markdown code fence from a model reply.
///
/// Handles both ```json ... ``` and plain ``` ... ``` blocks.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() > 6 {
        let start = trimmed.find('\n').map(|pos| pos + 1).unwrap_or(3);
        let end = trimmed.rfind("\n```").unwrap_or(trimmed.len() - 3);
        if start <= end {
            return trimmed[start..end].trim().to_string();
        }
    }

    trimmed.to_string()
}
