//! Shared component construction for CLI commands.

use quorum_agents::SqliteRegistry;
use quorum_core::{config::AppConfig, AppError, AppResult};
use quorum_knowledge::{create_embedder, KnowledgeStore, StoreSettings};
use quorum_llm::LlmClient;
use std::sync::Arc;

/// Create the generation client from configuration.
pub fn build_llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let api_key = config.resolve_api_key();
    quorum_llm::create_client(
        &config.provider,
        config.endpoint.as_deref(),
        api_key.as_deref(),
    )
    .map_err(AppError::Config)
}

/// Open the knowledge store backed by the workspace database.
pub fn build_store(config: &AppConfig) -> AppResult<Arc<KnowledgeStore>> {
    let api_key = config.resolve_api_key();
    let embedder = create_embedder(
        &config.embedding_provider,
        &config.embedding_model,
        config.embedding_dimensions,
        config.endpoint.as_deref(),
        api_key.as_deref(),
    )?;

    let settings = StoreSettings {
        chunk_size: config.chunk_size,
        chunk_overlap: config.chunk_overlap,
        min_similarity: config.min_similarity,
    };

    Ok(Arc::new(KnowledgeStore::open(
        &config.db_path(),
        embedder,
        settings,
    )?))
}

/// Open the agent registry backed by the workspace database.
pub fn build_registry(config: &AppConfig) -> AppResult<Arc<SqliteRegistry>> {
    Ok(Arc::new(SqliteRegistry::open(&config.db_path())?))
}
