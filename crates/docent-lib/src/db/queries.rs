#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::cmp::Ordering;
use std::fmt::Write as _;

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};

/// Create the collection row if it does not exist yet.
/// Returns the dimension recorded for the collection, if any vector was written.
pub fn ensure_collection(conn: &Connection, name: &str) -> anyhow::Result<Option<usize>> {
    conn.execute(
        "INSERT OR IGNORE INTO collections (name) VALUES (?1)",
        params![name],
    )
    .context("Failed to create collection")?;
    collection_dimension(conn, name)
}

/// Embedding dimension fixed for the collection, `None` until the first write.
pub fn collection_dimension(conn: &Connection, name: &str) -> anyhow::Result<Option<usize>> {
    let dimension = conn
        .query_row(
            "SELECT dimension FROM collections WHERE name = ?1",
            params![name],
            |row| row.get::<_, Option<i64>>(0),
        )
        .optional()
        .context("Failed to query collection")?
        .flatten();
    Ok(dimension.map(|d| d as usize))
}

/// Record the embedding dimension of a collection.
pub fn set_collection_dimension(
    conn: &Connection,
    name: &str,
    dimension: usize,
) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE collections SET dimension = ?2 WHERE name = ?1",
        params![name, dimension as i64],
    )
    .context("Failed to set collection dimension")?;
    Ok(())
}

/// Deterministic record id for a passage: hex SHA-256 of collection, source and index.
pub fn passage_id(collection: &str, source: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_bytes());
    hasher.update([0]);
    hasher.update(source.as_bytes());
    hasher.update([0]);
    hasher.update((chunk_index as u64).to_le_bytes());
    to_hex(&hasher.finalize()[..16])
}

/// Hex SHA-256 of a document body, used to detect changed sources.
pub fn content_hash(text: &str) -> String {
    to_hex(&Sha256::digest(text.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Insert a passage with its embedding, replacing any record with the same id.
pub fn upsert_passage(
    conn: &Connection,
    collection: &str,
    source: &str,
    chunk_index: usize,
    content: &str,
    embedding: &[f32],
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO passages (id, collection, source, chunk_index, content, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            passage_id(collection, source, chunk_index),
            collection,
            source,
            chunk_index as i64,
            content,
            encode_embedding(embedding),
        ],
    )
    .context("Failed to insert passage")?;
    Ok(())
}

/// Delete every passage of `source` in the collection.
pub fn delete_source_passages(
    conn: &Connection,
    collection: &str,
    source: &str,
) -> anyhow::Result<usize> {
    let deleted = conn
        .execute(
            "DELETE FROM passages WHERE collection = ?1 AND source = ?2",
            params![collection, source],
        )
        .context("Failed to delete passages")?;
    Ok(deleted)
}

/// Number of passages stored in the collection.
pub fn count_passages(conn: &Connection, collection: &str) -> anyhow::Result<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM passages WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )
        .context("Failed to count passages")?;
    Ok(count as usize)
}

/// Fingerprint of the last indexed version of a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub source: String,
    pub content_hash: String,
    pub passage_count: usize,
}

/// Get the fingerprint of a source. Returns `None` if it was never indexed.
pub fn get_source(
    conn: &Connection,
    collection: &str,
    source: &str,
) -> anyhow::Result<Option<SourceRecord>> {
    let record = conn
        .query_row(
            "SELECT source, content_hash, passage_count
             FROM sources WHERE collection = ?1 AND source = ?2",
            params![collection, source],
            |row| {
                Ok(SourceRecord {
                    source: row.get(0)?,
                    content_hash: row.get(1)?,
                    passage_count: row.get::<_, i64>(2)? as usize,
                })
            },
        )
        .optional()
        .context("Failed to query source")?;
    Ok(record)
}

/// Insert or update the fingerprint of a source.
pub fn upsert_source(
    conn: &Connection,
    collection: &str,
    record: &SourceRecord,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sources (collection, source, content_hash, passage_count, updated_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(collection, source) DO UPDATE SET
           content_hash = excluded.content_hash,
           passage_count = excluded.passage_count,
           updated_at = datetime('now')",
        params![
            collection,
            record.source,
            record.content_hash,
            record.passage_count as i64,
        ],
    )
    .context("Failed to upsert source")?;
    Ok(())
}

/// A search result from vector similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct PassageSearchResult {
    pub source: String,
    pub chunk_index: usize,
    pub content: String,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,
}

/// Search for the top-k passages by cosine similarity with a full scan of the
/// collection. Ties are broken by source, then chunk index.
pub fn search_passages(
    conn: &Connection,
    collection: &str,
    query_embedding: &[f32],
    k: usize,
) -> anyhow::Result<Vec<PassageSearchResult>> {
    let mut stmt = conn
        .prepare(
            "SELECT source, chunk_index, content, embedding
             FROM passages WHERE collection = ?1",
        )
        .context("Failed to prepare search query")?;

    let rows = stmt
        .query_map(params![collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)? as usize,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })
        .context("Failed to search passages")?;

    let mut results = Vec::new();
    for row in rows {
        let (source, chunk_index, content, blob) = row.context("Failed to read passage row")?;
        let embedding = decode_embedding(&blob)?;
        let Some(score) = cosine_similarity(query_embedding, &embedding) else {
            continue;
        };
        results.push(PassageSearchResult {
            source,
            chunk_index,
            content,
            score,
        });
    }

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.chunk_index.cmp(&b.chunk_index))
    });
    results.truncate(k);

    Ok(results)
}

/// Serialize an embedding as little-endian `f32` bytes.
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Inverse of [`encode_embedding`].
pub fn decode_embedding(blob: &[u8]) -> anyhow::Result<Vec<f32>> {
    anyhow::ensure!(
        blob.len() % 4 == 0,
        "Corrupt embedding blob of {} bytes",
        blob.len()
    );
    Ok(blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity, `None` for mismatched lengths or zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if denom <= f32::EPSILON {
        None
    } else {
        Some(dot / denom)
    }
}
