//! Persisted vector store for question embeddings. Append-only SQLite table:
//! one row per embedded sentence, vector stored as a little-endian f32 blob.
//!
//! Rows are never updated or deleted by the core; re-ingesting the same
//! corpus appends duplicates. Callers needing a fresh start use [`VectorStore::clear`].

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

/// One stored row: the exact sentence that was embedded and its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRecord {
    pub sentence: String,
    pub vector: Vec<f32>,
}

/// SQLite-backed vector store. Holds (sentence, vector) rows in insertion order.
pub struct VectorStore {
    conn: Connection,
}

impl VectorStore {
    /// Open (or create) the store at `path`. The parent directory is created
    /// if missing. Fails with [`StoreError::Open`] when the database cannot
    /// be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::CreateDir(parent.to_path_buf(), e))?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Open(path.to_path_buf(), e))?;
        Self::setup(&conn)?;
        Ok(Self { conn })
    }

    /// Open an ephemeral in-memory store. Useful for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Open(PathBuf::from(":memory:"), e))?;
        Self::setup(&conn)?;
        Ok(Self { conn })
    }

    fn setup(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embeddings (
                sentence TEXT NOT NULL,
                vector BLOB NOT NULL
            )",
        )?;
        Ok(())
    }

    /// Append one (sentence, vector) row. No uniqueness check.
    pub fn append(&self, sentence: &str, vector: &[f32]) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO embeddings (sentence, vector) VALUES (?1, ?2)",
            params![sentence, encode_vector(vector)],
        )?;
        Ok(())
    }

    /// Append many rows in one transaction, preserving order.
    pub fn append_batch(&self, records: &[EmbeddingRecord]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO embeddings (sentence, vector) VALUES (?1, ?2)")?;
            for record in records {
                stmt.execute(params![record.sentence, encode_vector(&record.vector)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Returns every stored row in insertion order. An empty store yields an
    /// empty vec, not an error; the matcher decides what that means.
    pub fn read_all(&self) -> Result<Vec<EmbeddingRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT sentence, vector FROM embeddings ORDER BY rowid")?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let sentence: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            records.push(EmbeddingRecord {
                sentence,
                vector: decode_vector(&blob)?,
            });
        }
        Ok(records)
    }

    /// Number of stored rows.
    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Delete every row. The escape hatch for callers that want re-ingestion
    /// to replace rather than duplicate.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM embeddings", [])?;
        Ok(())
    }
}

/// Serializes a vector as consecutive little-endian f32 bytes.
fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Inverse of [`encode_vector`]. Bit-exact: distances are computed on the
/// decoded values, so no rounding is tolerated.
fn decode_vector(blob: &[u8]) -> Result<Vec<f32>, StoreError> {
    if blob.len() % 4 != 0 {
        return Err(StoreError::Corrupt(blob.len()));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not create database directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("could not open embeddings database {0}: {1}")]
    Open(PathBuf, rusqlite::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt vector blob: {0} bytes is not a whole number of f32 values")]
    Corrupt(usize),
}
