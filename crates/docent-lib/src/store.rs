//! Vector store over a persistent `SQLite` collection.
//!
//! The store owns its connection and embedder. It is opened once at startup,
//! passed explicitly to whoever needs it, and closed at shutdown.

use anyhow::Context;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::queries::{self, PassageSearchResult, SourceRecord};
use crate::embedding::Embed;
use crate::error::{Error, Result, ResultExt};
use crate::pipeline::chunker::Passage;

/// A retrieved passage with its similarity to the query.
pub type ScoredPassage = PassageSearchResult;

/// Handle to one named collection of embedded passages.
pub struct VectorStore<E: Embed> {
    conn: Connection,
    collection: String,
    embedder: E,
}

impl<E: Embed> VectorStore<E> {
    /// Open `collection` on `conn`, creating it on first use.
    pub fn open(conn: Connection, collection: &str, embedder: E) -> Result<Self> {
        let dimension = queries::ensure_collection(&conn, collection).storage_err()?;
        if let Some(stored) = dimension
            && stored != embedder.dimension()
        {
            return Err(Error::Storage(anyhow::anyhow!(
                "Collection {collection} holds {stored}-dimensional embeddings, \
                 but the embedder produces {}",
                embedder.dimension()
            )));
        }
        debug!(collection, ?dimension, "Opened vector collection");
        Ok(Self {
            conn,
            collection: collection.to_string(),
            embedder,
        })
    }

    /// Mutable access to the embedder, mainly for inspection in tests.
    pub fn embedder_mut(&mut self) -> &mut E {
        &mut self.embedder
    }

    /// Embed and write passages. Records are keyed by (source, index), so
    /// writing the same passages again overwrites them.
    pub fn upsert(&mut self, passages: &[Passage]) -> Result<usize> {
        if passages.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).embedding_err()?;
        self.check_dimension(&embeddings)?;

        for (passage, embedding) in passages.iter().zip(embeddings.iter()) {
            queries::upsert_passage(
                &self.conn,
                &self.collection,
                &passage.source,
                passage.index,
                &passage.text,
                embedding,
            )
            .with_context(|| format!("passage {}#{}", passage.source, passage.index))
            .storage_err()?;
        }

        debug!(
            collection = %self.collection,
            count = passages.len(),
            "Upserted passages"
        );
        Ok(passages.len())
    }

    /// Return up to `top_k` passages ordered by decreasing similarity to `text`.
    /// An empty collection yields an empty result without embedding the query.
    pub fn query(&mut self, text: &str, top_k: usize) -> Result<Vec<ScoredPassage>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.count()? == 0 {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed_batch(&[text]).embedding_err()?;
        let query_embedding = embeddings
            .first()
            .ok_or_else(|| Error::Embedding(anyhow::anyhow!("Embedder returned no vector")))?;

        queries::search_passages(&self.conn, &self.collection, query_embedding, top_k)
            .storage_err()
    }

    /// Number of records in the collection.
    pub fn count(&self) -> Result<usize> {
        queries::count_passages(&self.conn, &self.collection).storage_err()
    }

    /// Fingerprint of the last indexed version of `source`, if any.
    pub fn source_fingerprint(&self, source: &str) -> Result<Option<SourceRecord>> {
        queries::get_source(&self.conn, &self.collection, source).storage_err()
    }

    /// Replace every passage of `source` with `passages` and record the new
    /// fingerprint. The fingerprint is written last, so an interrupted
    /// replacement is redone on the next run.
    pub fn replace_source(
        &mut self,
        source: &str,
        content_hash: &str,
        passages: &[Passage],
    ) -> Result<usize> {
        let deleted = queries::delete_source_passages(&self.conn, &self.collection, source)
            .storage_err()?;
        if deleted > 0 {
            debug!(source, deleted, "Deleted stale passages");
        }

        let written = self.upsert(passages)?;
        queries::upsert_source(
            &self.conn,
            &self.collection,
            &SourceRecord {
                source: source.to_string(),
                content_hash: content_hash.to_string(),
                passage_count: written,
            },
        )
        .storage_err()?;
        Ok(written)
    }

    /// Flush and close the underlying connection.
    pub fn close(self) -> Result<()> {
        let collection = self.collection;
        self.conn
            .close()
            .map_err(|(_, e)| Error::Storage(anyhow::Error::new(e).context("Failed to close database")))?;
        info!(collection = %collection, "Closed vector collection");
        Ok(())
    }

    /// Enforce a single embedding dimension per collection, fixing it on first write.
    fn check_dimension(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        let Some(first) = embeddings.first() else {
            return Ok(());
        };
        let dimension = first.len();
        if embeddings.iter().any(|e| e.len() != dimension) {
            return Err(Error::Storage(anyhow::anyhow!(
                "Embedder returned vectors of differing lengths"
            )));
        }

        match queries::collection_dimension(&self.conn, &self.collection).storage_err()? {
            Some(stored) if stored != dimension => Err(Error::Storage(anyhow::anyhow!(
                "Embedding dimension {dimension} does not match collection dimension {stored}"
            ))),
            Some(_) => Ok(()),
            None => {
                queries::set_collection_dimension(&self.conn, &self.collection, dimension)
                    .storage_err()
            }
        }
    }
}
