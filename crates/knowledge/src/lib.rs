//! Per-agent knowledge store.
//!
//! Maintains a searchable index of document chunks, isolated per agent:
//! chunking with overlap, embedding via a pluggable provider, cosine
//! similarity retrieval, and transactional cascade deletion. Backed by
//! SQLite with the owning agent id as partition key on every row.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod store;
pub mod types;

pub use embeddings::{create_embedder, EmbeddingProvider};
pub use store::KnowledgeStore;
pub use types::{DocumentRecord, ScoredChunk, StoreSettings, StoreStats, StoredChunk};
