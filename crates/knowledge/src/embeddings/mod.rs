//! Embedding provider abstraction and factory.

pub mod providers;

use quorum_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama", "openai")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from configuration values.
///
/// # Arguments
/// * `provider` - Provider identifier ("mock", "ollama", "openai")
/// * `model` - Embedding model name
/// * `dimensions` - Expected vector dimensions
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
pub fn create_embedder(
    provider: &str,
    model: &str,
    dimensions: usize,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(providers::mock::MockEmbedder::new(dimensions))),

        "ollama" => Ok(Arc::new(providers::ollama::OllamaEmbedder::new(
            endpoint.unwrap_or("http://localhost:11434"),
            model,
            dimensions,
        ))),

        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Knowledge("OpenAI embedding provider requires API key".to_string())
            })?;
            Ok(Arc::new(providers::openai::OpenAiEmbedder::new(
                endpoint.unwrap_or("https://api.openai.com/v1"),
                api_key,
                model,
                dimensions,
            )))
        }

        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: mock, ollama, openai",
            provider
        ))),
    }
}
