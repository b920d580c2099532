//! Configuration management for Quorum.
//!
//! This module handles loading and merging configuration from multiple
//! sources, in increasing order of precedence:
//! - Built-in defaults
//! - Config file (`.quorum/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: agents, documents, and the chunk
//! index all live under `.quorum/` inside the workspace.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .quorum/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider (e.g., "ollama", "openai")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Optional custom endpoint for the generation provider
    pub endpoint: Option<String>,

    /// Embedding provider (e.g., "mock", "ollama", "openai")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimensions
    pub embedding_dimensions: usize,

    /// Target chunk length in characters
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    pub retrieval_top_k: usize,

    /// Minimum cosine similarity for a chunk to count as evidence
    pub min_similarity: f32,

    /// API key for providers that require one
    pub api_key: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// On-disk configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embeddings: Option<EmbeddingsSection>,
    knowledge: Option<KnowledgeSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingsSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    #[serde(rename = "chunkSize")]
    chunk_size: Option<usize>,
    #[serde(rename = "chunkOverlap")]
    chunk_overlap: Option<usize>,
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "minSimilarity")]
    min_similarity: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            embedding_provider: "mock".to_string(),
            embedding_model: "trigram-v1".to_string(),
            embedding_dimensions: 384,
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_top_k: 4,
            min_similarity: 0.20,
            api_key: None,
            api_key_env: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `QUORUM_WORKSPACE`: Override workspace path
    /// - `QUORUM_CONFIG`: Path to config file
    /// - `QUORUM_PROVIDER`: Generation provider
    /// - `QUORUM_MODEL`: Generation model
    /// - `QUORUM_EMBEDDING_PROVIDER`: Embedding provider
    /// - `QUORUM_EMBEDDING_MODEL`: Embedding model
    /// - `QUORUM_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("QUORUM_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("QUORUM_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".quorum/config.yaml")
        };

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("QUORUM_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("QUORUM_MODEL") {
            config.model = model;
        }

        if let Ok(provider) = std::env::var("QUORUM_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }

        if let Ok(model) = std::env::var("QUORUM_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        config.api_key = std::env::var("QUORUM_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                self.provider = provider;
            }
            if let Some(model) = llm.model {
                self.model = model;
            }
            if llm.endpoint.is_some() {
                self.endpoint = llm.endpoint;
            }
            if llm.api_key_env.is_some() {
                self.api_key_env = llm.api_key_env;
            }
        }

        if let Some(embeddings) = config_file.embeddings {
            if let Some(provider) = embeddings.provider {
                self.embedding_provider = provider;
            }
            if let Some(model) = embeddings.model {
                self.embedding_model = model;
            }
            if let Some(dimensions) = embeddings.dimensions {
                self.embedding_dimensions = dimensions;
            }
        }

        if let Some(knowledge) = config_file.knowledge {
            if let Some(chunk_size) = knowledge.chunk_size {
                self.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = knowledge.chunk_overlap {
                self.chunk_overlap = chunk_overlap;
            }
            if let Some(top_k) = knowledge.top_k {
                self.retrieval_top_k = top_k;
            }
            if let Some(min_similarity) = knowledge.min_similarity {
                self.min_similarity = min_similarity;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over both environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .quorum directory.
    pub fn quorum_dir(&self) -> PathBuf {
        self.workspace.join(".quorum")
    }

    /// Get the path to the SQLite database holding agents, documents,
    /// and chunks.
    pub fn db_path(&self) -> PathBuf {
        self.quorum_dir().join("quorum.db")
    }

    /// Ensure the .quorum directory exists.
    pub fn ensure_quorum_dir(&self) -> AppResult<()> {
        let dir = self.quorum_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .quorum directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the API key for the generation provider.
    ///
    /// `QUORUM_API_KEY` wins; otherwise the env var named by `apiKeyEnv`
    /// in the config file is consulted.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }

        None
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        let known_embedders = ["mock", "ollama", "openai"];
        if !known_embedders.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_embedders.join(", ")
            )));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}
