//! Knowledge store type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tuning knobs for chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Target chunk length in characters
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters.
    /// Overlap exists so context spanning a chunk boundary is not lost.
    pub chunk_overlap: usize,

    /// Minimum cosine similarity for a chunk to count as a match.
    /// Range: -1.0 to 1.0. 0.20 suits the mock embedder; real embedding
    /// models usually want 0.3-0.5.
    pub min_similarity: f32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_similarity: 0.20,
        }
    }
}

/// Bookkeeping row for an ingested document.
///
/// Lives in the same database as the chunks derived from it, so the two
/// cannot drift apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique document identifier
    pub id: String,

    /// Owning agent id (partition key)
    pub agent_id: String,

    /// Original filename
    pub filename: String,

    /// Raw text size in bytes
    pub size_bytes: u64,

    /// Number of chunks derived from this document
    pub chunk_count: u32,

    /// When the document was ingested
    pub ingested_at: DateTime<Utc>,
}

/// A stored chunk: a bounded span of document text with its embedding.
///
/// Chunks are never mutated after creation; they are only created during
/// ingestion and removed by cascade deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Owning agent id (partition key)
    pub agent_id: String,

    /// Document this chunk was derived from
    pub document_id: String,

    /// Original filename of the source document
    pub source_filename: String,

    /// Position within the source document
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: StoredChunk,
    pub score: f32,
}

/// Aggregate counts over the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of documents across all partitions
    pub documents_count: u32,

    /// Number of chunks across all partitions
    pub chunks_count: u32,
}

/// A chunked span of text before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpan {
    /// Position within the source text
    pub position: u32,

    /// Span text, trimmed
    pub text: String,
}
