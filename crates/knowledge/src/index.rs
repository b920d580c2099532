//! SQLite-backed chunk index, partitioned by agent id.
//!
//! One logical index holds every agent's chunks; each row carries its
//! owning agent id as partition key. That keeps partition deletion and
//! per-document cascades a single indexed DELETE instead of a walk over
//! scattered collections.

use crate::types::{DocumentRecord, StoredChunk};
use chrono::{DateTime, Utc};
use quorum_core::{AppError, AppResult};
use rusqlite::{params, Connection, Transaction};
use std::path::Path;

/// Open (or create) the index database at the given path.
pub fn open_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    init_schema(&conn)?;

    tracing::debug!("Opened chunk index at {:?}", db_path);
    Ok(conn)
}

/// Open an in-memory index, used by tests.
pub fn open_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| AppError::Knowledge(format!("Failed to open in-memory index: {}", e)))?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            chunk_count INTEGER NOT NULL,
            ingested_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            agent_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            source_filename TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_agent ON documents(agent_id);
        CREATE INDEX IF NOT EXISTS idx_chunks_agent ON chunks(agent_id);
        CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(agent_id, document_id);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    Ok(())
}

/// Insert a document row inside an open transaction.
pub fn insert_document(tx: &Transaction<'_>, document: &DocumentRecord) -> AppResult<()> {
    tx.execute(
        "INSERT INTO documents (id, agent_id, filename, size_bytes, chunk_count, ingested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            document.id,
            document.agent_id,
            document.filename,
            document.size_bytes as i64,
            document.chunk_count as i64,
            document.ingested_at.to_rfc3339(),
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert document: {}", e)))?;

    Ok(())
}

/// Insert a chunk row inside an open transaction.
pub fn insert_chunk(tx: &Transaction<'_>, chunk: &StoredChunk) -> AppResult<()> {
    let embedding = chunk
        .embedding
        .as_ref()
        .ok_or_else(|| AppError::Knowledge("Chunk missing embedding".to_string()))?;

    tx.execute(
        "INSERT INTO chunks (id, agent_id, document_id, source_filename, position, text, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            chunk.id,
            chunk.agent_id,
            chunk.document_id,
            chunk.source_filename,
            chunk.position as i64,
            chunk.text,
            embedding_to_bytes(embedding),
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

/// Load every chunk in one agent's partition.
pub fn partition_chunks(conn: &Connection, agent_id: &str) -> AppResult<Vec<StoredChunk>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, agent_id, document_id, source_filename, position, text, embedding
             FROM chunks WHERE agent_id = ?1",
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map(params![agent_id], |row| {
            let embedding_bytes: Vec<u8> = row.get(6)?;
            let embedding = bytes_to_embedding(&embedding_bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

            Ok(StoredChunk {
                id: row.get(0)?,
                agent_id: row.get(1)?,
                document_id: row.get(2)?,
                source_filename: row.get(3)?,
                position: row.get::<_, i64>(4)? as u32,
                text: row.get(5)?,
                embedding: Some(embedding),
            })
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut chunks = Vec::new();
    for row in rows {
        chunks.push(row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk row: {}", e)))?);
    }

    Ok(chunks)
}

/// Remove one document and every chunk derived from it, atomically.
///
/// Returns the number of chunks removed. Deleting an absent document is a
/// no-op, not an error.
pub fn delete_document(conn: &mut Connection, agent_id: &str, document_id: &str) -> AppResult<u32> {
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to start transaction: {}", e)))?;

    let removed = tx
        .execute(
            "DELETE FROM chunks WHERE agent_id = ?1 AND document_id = ?2",
            params![agent_id, document_id],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;

    tx.execute(
        "DELETE FROM documents WHERE agent_id = ?1 AND id = ?2",
        params![agent_id, document_id],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to delete document: {}", e)))?;

    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit deletion: {}", e)))?;

    Ok(removed as u32)
}

/// Remove an agent's entire partition: all chunks and document rows.
pub fn delete_partition(conn: &mut Connection, agent_id: &str) -> AppResult<u32> {
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Knowledge(format!("Failed to start transaction: {}", e)))?;

    let removed = tx
        .execute("DELETE FROM chunks WHERE agent_id = ?1", params![agent_id])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete partition chunks: {}", e)))?;

    tx.execute(
        "DELETE FROM documents WHERE agent_id = ?1",
        params![agent_id],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to delete partition documents: {}", e)))?;

    tx.commit()
        .map_err(|e| AppError::Knowledge(format!("Failed to commit partition deletion: {}", e)))?;

    Ok(removed as u32)
}

/// List the document rows in one agent's partition, newest first.
pub fn partition_documents(conn: &Connection, agent_id: &str) -> AppResult<Vec<DocumentRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, agent_id, filename, size_bytes, chunk_count, ingested_at
             FROM documents WHERE agent_id = ?1 ORDER BY ingested_at DESC",
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map(params![agent_id], |row| {
            let ingested_at: String = row.get(5)?;
            let ingested_at = DateTime::parse_from_rfc3339(&ingested_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

            Ok(DocumentRecord {
                id: row.get(0)?,
                agent_id: row.get(1)?,
                filename: row.get(2)?,
                size_bytes: row.get::<_, i64>(3)? as u64,
                chunk_count: row.get::<_, i64>(4)? as u32,
                ingested_at,
            })
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query documents: {}", e)))?;

    let mut documents = Vec::new();
    for row in rows {
        documents
            .push(row.map_err(|e| AppError::Knowledge(format!("Failed to read document row: {}", e)))?);
    }

    Ok(documents)
}

/// Count documents and chunks across all partitions.
pub fn counts(conn: &Connection) -> AppResult<(u32, u32)> {
    let documents: u32 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count documents: {}", e)))?;

    let chunks: u32 = conn
        .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))?;

    Ok((documents, chunks))
}

/// Convert an embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk(agent_id: &str, document_id: &str, position: u32) -> StoredChunk {
        StoredChunk {
            id: format!("{}-{}-{}", agent_id, document_id, position),
            agent_id: agent_id.to_string(),
            document_id: document_id.to_string(),
            source_filename: "policy.txt".to_string(),
            position,
            text: format!("chunk {}", position),
            embedding: Some(vec![1.0, 0.0, 0.0]),
        }
    }

    fn sample_document(agent_id: &str, id: &str, chunk_count: u32) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            agent_id: agent_id.to_string(),
            filename: "policy.txt".to_string(),
            size_bytes: 100,
            chunk_count,
            ingested_at: Utc::now(),
        }
    }

    fn insert_fixture(conn: &mut Connection, agent_id: &str, document_id: &str, chunks: u32) {
        let tx = conn.transaction().unwrap();
        insert_document(&tx, &sample_document(agent_id, document_id, chunks)).unwrap();
        for position in 0..chunks {
            insert_chunk(&tx, &sample_chunk(agent_id, document_id, position)).unwrap();
        }
        tx.commit().unwrap();
    }

    #[test]
    fn test_open_index_creates_tables() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let conn = open_index(temp_file.path()).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(table_count >= 2);
    }

    #[test]
    fn test_insert_and_load_partition() {
        let mut conn = open_in_memory().unwrap();
        insert_fixture(&mut conn, "agent-a", "doc-1", 3);

        let chunks = partition_chunks(&conn, "agent-a").unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.agent_id == "agent-a"));
        assert!(chunks.iter().all(|c| c.embedding.is_some()));
    }

    #[test]
    fn test_partition_is_isolated() {
        let mut conn = open_in_memory().unwrap();
        insert_fixture(&mut conn, "agent-a", "doc-1", 2);
        insert_fixture(&mut conn, "agent-b", "doc-2", 5);

        assert_eq!(partition_chunks(&conn, "agent-a").unwrap().len(), 2);
        assert_eq!(partition_chunks(&conn, "agent-b").unwrap().len(), 5);
        assert!(partition_chunks(&conn, "agent-c").unwrap().is_empty());
    }

    #[test]
    fn test_delete_document_cascades_and_is_idempotent() {
        let mut conn = open_in_memory().unwrap();
        insert_fixture(&mut conn, "agent-a", "doc-1", 4);
        insert_fixture(&mut conn, "agent-a", "doc-2", 2);

        let removed = delete_document(&mut conn, "agent-a", "doc-1").unwrap();
        assert_eq!(removed, 4);

        let remaining = partition_chunks(&conn, "agent-a").unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|c| c.document_id == "doc-2"));
        assert_eq!(partition_documents(&conn, "agent-a").unwrap().len(), 1);

        // Second delete is a no-op
        let removed_again = delete_document(&mut conn, "agent-a", "doc-1").unwrap();
        assert_eq!(removed_again, 0);
    }

    #[test]
    fn test_delete_partition_leaves_others() {
        let mut conn = open_in_memory().unwrap();
        insert_fixture(&mut conn, "agent-a", "doc-1", 3);
        insert_fixture(&mut conn, "agent-b", "doc-2", 3);

        delete_partition(&mut conn, "agent-a").unwrap();

        assert!(partition_chunks(&conn, "agent-a").unwrap().is_empty());
        assert!(partition_documents(&conn, "agent-a").unwrap().is_empty());
        assert_eq!(partition_chunks(&conn, "agent-b").unwrap().len(), 3);
    }

    #[test]
    fn test_counts() {
        let mut conn = open_in_memory().unwrap();
        insert_fixture(&mut conn, "agent-a", "doc-1", 3);
        insert_fixture(&mut conn, "agent-b", "doc-2", 2);

        assert_eq!(counts(&conn).unwrap(), (2, 5));
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let embedding = vec![0.25, -1.5, 3.75, 0.0];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), embedding);

        assert!(bytes_to_embedding(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }
}
