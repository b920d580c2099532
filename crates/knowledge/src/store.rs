//! The knowledge store facade.
//!
//! Owns chunking, embedding, indexing, similarity retrieval, and deletion
//! of documents, isolated per agent. Writes are transactional: a
//! concurrent retrieve observes either the pre-write or post-write
//! partition, never a mix.

use crate::chunker;
use crate::embeddings::EmbeddingProvider;
use crate::index;
use crate::types::{DocumentRecord, ScoredChunk, StoreSettings, StoreStats, StoredChunk};
use chrono::Utc;
use quorum_core::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Per-agent searchable index of document chunks.
pub struct KnowledgeStore {
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
    settings: StoreSettings,
}

impl KnowledgeStore {
    /// Open a store backed by the database at `db_path`.
    pub fn open(
        db_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: StoreSettings,
    ) -> AppResult<Self> {
        let conn = index::open_index(db_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            settings,
        })
    }

    /// Open an in-memory store, used by tests.
    pub fn in_memory(
        embedder: Arc<dyn EmbeddingProvider>,
        settings: StoreSettings,
    ) -> AppResult<Self> {
        let conn = index::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            settings,
        })
    }

    /// Ingest a document into an agent's partition.
    ///
    /// Splits `raw_text` into overlapping spans, embeds each span, and
    /// stores every chunk tagged with `(document_id, source_filename)`
    /// under `agent_id`. The document row and all chunks land in a single
    /// transaction.
    pub async fn ingest(
        &self,
        agent_id: &str,
        document_id: &str,
        raw_text: &str,
        source_filename: &str,
    ) -> AppResult<DocumentRecord> {
        tracing::info!(
            "Ingesting '{}' ({} bytes) into partition '{}'",
            source_filename,
            raw_text.len(),
            agent_id
        );

        let spans = chunker::split_text(raw_text, self.settings.chunk_size, self.settings.chunk_overlap);

        if spans.is_empty() {
            tracing::warn!("Document '{}' produced no chunks", source_filename);
        }

        let texts: Vec<String> = spans.iter().map(|s| s.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != spans.len() {
            return Err(AppError::Knowledge(format!(
                "Embedder returned {} vectors for {} spans",
                embeddings.len(),
                spans.len()
            )));
        }

        let document = DocumentRecord {
            id: document_id.to_string(),
            agent_id: agent_id.to_string(),
            filename: source_filename.to_string(),
            size_bytes: raw_text.len() as u64,
            chunk_count: spans.len() as u32,
            ingested_at: Utc::now(),
        };

        let chunks: Vec<StoredChunk> = spans
            .into_iter()
            .zip(embeddings)
            .map(|(span, embedding)| StoredChunk {
                id: uuid::Uuid::new_v4().to_string(),
                agent_id: agent_id.to_string(),
                document_id: document_id.to_string(),
                source_filename: source_filename.to_string(),
                position: span.position,
                text: span.text,
                embedding: Some(embedding),
            })
            .collect();

        let mut conn = self.lock_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to start transaction: {}", e)))?;

        index::insert_document(&tx, &document)?;
        for chunk in &chunks {
            index::insert_chunk(&tx, chunk)?;
        }

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit ingestion: {}", e)))?;

        tracing::info!(
            "Ingested '{}': {} chunks into partition '{}'",
            source_filename,
            document.chunk_count,
            agent_id
        );

        Ok(document)
    }

    /// Retrieve up to `k` chunks from an agent's partition, ordered by
    /// descending similarity to `query_text`.
    ///
    /// An empty partition or no match above the similarity floor yields an
    /// empty list, never an error.
    pub async fn retrieve(
        &self,
        agent_id: &str,
        query_text: &str,
        k: usize,
    ) -> AppResult<Vec<ScoredChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query_text).await?;

        let chunks = {
            let conn = self.lock_conn()?;
            index::partition_chunks(&conn, agent_id)?
        };

        if chunks.is_empty() {
            tracing::debug!("Partition '{}' has no chunks", agent_id);
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|chunk| {
                let score = chunk
                    .embedding
                    .as_deref()
                    .map(|e| index::cosine_similarity(&query_embedding, e))
                    .unwrap_or(0.0);
                ScoredChunk { chunk, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        scored.retain(|s| s.score >= self.settings.min_similarity);
        scored.truncate(k);

        tracing::info!(
            "Retrieved {} chunks from partition '{}' (top score: {:.3})",
            scored.len(),
            agent_id,
            scored.first().map(|s| s.score).unwrap_or(0.0)
        );

        Ok(scored)
    }

    /// Remove a document and every chunk derived from it.
    ///
    /// All-or-nothing per document. Calling it twice is safe, the second
    /// call is a no-op. Returns the number of chunks removed.
    pub fn delete(&self, agent_id: &str, document_id: &str) -> AppResult<u32> {
        let mut conn = self.lock_conn()?;
        let removed = index::delete_document(&mut conn, agent_id, document_id)?;

        if removed > 0 {
            tracing::info!(
                "Deleted document '{}' ({} chunks) from partition '{}'",
                document_id,
                removed,
                agent_id
            );
        } else {
            tracing::debug!(
                "Document '{}' not present in partition '{}'",
                document_id,
                agent_id
            );
        }

        Ok(removed)
    }

    /// Remove an agent's entire partition. Other partitions are untouched.
    pub fn delete_partition(&self, agent_id: &str) -> AppResult<u32> {
        let mut conn = self.lock_conn()?;
        let removed = index::delete_partition(&mut conn, agent_id)?;
        tracing::info!(
            "Deleted partition '{}' ({} chunks)",
            agent_id,
            removed
        );
        Ok(removed)
    }

    /// List the documents in an agent's partition.
    pub fn documents(&self, agent_id: &str) -> AppResult<Vec<DocumentRecord>> {
        let conn = self.lock_conn()?;
        index::partition_documents(&conn, agent_id)
    }

    /// Aggregate counts across all partitions.
    pub fn stats(&self) -> AppResult<StoreStats> {
        let conn = self.lock_conn()?;
        let (documents_count, chunks_count) = index::counts(&conn)?;
        Ok(StoreStats {
            documents_count,
            chunks_count,
        })
    }

    fn lock_conn(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Index lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::mock::MockEmbedder;

    fn test_store() -> KnowledgeStore {
        let embedder = Arc::new(MockEmbedder::new(384));
        KnowledgeStore::in_memory(embedder, StoreSettings::default()).unwrap()
    }

    const HR_TEXT: &str = "Employees accrue twenty days of paid vacation per year. \
        Harassment should be reported to the human resources team immediately. \
        Health benefits enrollment opens every November.";

    const TECH_TEXT: &str = "Deployment keys rotate every ninety days. \
        Production infrastructure runs on the east cluster. \
        Escalate outages to the on-call engineer.";

    #[tokio::test]
    async fn test_ingest_retrieve_round_trip() {
        let store = test_store();
        store
            .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
            .await
            .unwrap();

        let results = store
            .retrieve("agent-hr", "paid vacation days", 4)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].chunk.source_filename, "hr_handbook.txt");
    }

    #[tokio::test]
    async fn test_partition_isolation() {
        let store = test_store();
        store
            .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
            .await
            .unwrap();
        store
            .ingest("agent-tech", "doc-2", TECH_TEXT, "runbook.txt")
            .await
            .unwrap();

        // However similar the query, agent-tech never sees agent-hr chunks
        let results = store
            .retrieve("agent-tech", "paid vacation days", 10)
            .await
            .unwrap();
        assert!(results
            .iter()
            .all(|s| s.chunk.source_filename == "runbook.txt"));

        let empty = store
            .retrieve("agent-none", "paid vacation days", 10)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_empty_partition_is_ok() {
        let store = test_store();
        let results = store.retrieve("agent-hr", "anything", 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_ordering_and_truncation() {
        let store = test_store();
        let long_text = format!("{} {}", HR_TEXT.repeat(4), TECH_TEXT.repeat(4));
        store
            .ingest("agent-a", "doc-1", &long_text, "mixed.txt")
            .await
            .unwrap();

        let results = store
            .retrieve("agent-a", "report harassment to human resources", 2)
            .await
            .unwrap();

        assert!(results.len() <= 2);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = test_store();
        store
            .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
            .await
            .unwrap();

        let removed = store.delete("agent-hr", "doc-1").unwrap();
        assert!(removed > 0);

        let results = store
            .retrieve("agent-hr", "paid vacation days", 4)
            .await
            .unwrap();
        assert!(results.is_empty());

        // Second call is a no-op, not an error
        assert_eq!(store.delete("agent-hr", "doc-1").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_partition_spares_others() {
        let store = test_store();
        store
            .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
            .await
            .unwrap();
        store
            .ingest("agent-tech", "doc-2", TECH_TEXT, "runbook.txt")
            .await
            .unwrap();

        store.delete_partition("agent-hr").unwrap();

        assert!(store.documents("agent-hr").unwrap().is_empty());
        assert_eq!(store.documents("agent-tech").unwrap().len(), 1);

        let results = store
            .retrieve("agent-tech", "deployment keys", 4)
            .await
            .unwrap();
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_documents_and_stats() {
        let store = test_store();
        let record = store
            .ingest("agent-hr", "doc-1", HR_TEXT, "hr_handbook.txt")
            .await
            .unwrap();
        assert_eq!(record.filename, "hr_handbook.txt");
        assert!(record.chunk_count > 0);

        let documents = store.documents("agent-hr").unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "doc-1");

        let stats = store.stats().unwrap();
        assert_eq!(stats.documents_count, 1);
        assert_eq!(stats.chunks_count, record.chunk_count);
    }
}
