use std::path::Path;

use tracing::{debug, info};

use crate::db::queries::content_hash;
use crate::embedding::Embed;
use crate::error::Result;
use crate::loader::{Document, load_documents};
use crate::pipeline::chunker::{Chunker, Passage};
use crate::store::VectorStore;

/// Counts from one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents that were new or changed and got (re)indexed.
    pub indexed: usize,
    /// Documents whose content matched the stored fingerprint.
    pub unchanged: usize,
    /// Passages written during this run.
    pub passages: usize,
}

/// Load every document under `dir` and index the new or changed ones.
pub fn ingest_directory<E: Embed>(
    store: &mut VectorStore<E>,
    chunker: &Chunker,
    dir: &Path,
) -> Result<IngestReport> {
    let documents = load_documents(dir)?;
    ingest_documents(store, chunker, &documents)
}

/// Index documents whose content or chunking differs from the last indexed
/// version.
///
/// For each new or changed document:
/// 1. Chunk it.
/// 2. Delete the passages of its previous version.
/// 3. Embed and store the new passages.
/// 4. Record the content fingerprint.
///
/// Writes are per document; a failure leaves earlier documents indexed and
/// the next run resumes with the rest.
pub fn ingest_documents<E: Embed>(
    store: &mut VectorStore<E>,
    chunker: &Chunker,
    documents: &[Document],
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for doc in documents {
        let hash = fingerprint(chunker, doc);
        if let Some(existing) = store.source_fingerprint(&doc.source)?
            && existing.content_hash == hash
        {
            debug!(source = %doc.source, "Document unchanged, skipping");
            report.unchanged += 1;
            continue;
        }

        let passages: Vec<Passage> = chunker.chunk(doc).collect();
        let written = store.replace_source(&doc.source, &hash, &passages)?;
        debug!(source = %doc.source, passages = written, "Indexed document");

        report.indexed += 1;
        report.passages += written;
    }

    info!(
        "Ingested {} documents ({} indexed, {} unchanged, {} passages written)",
        documents.len(),
        report.indexed,
        report.unchanged,
        report.passages,
    );

    Ok(report)
}

/// Hash of the chunking settings together with the document body.
fn fingerprint(chunker: &Chunker, doc: &Document) -> String {
    content_hash(&format!("{}\n{}", chunker.strategy(), doc.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::{open_db, open_db_in_memory};
    use crate::error::Error;
    use crate::pipeline::chunker::ChunkStrategy;
    use crate::test_util::{HashEmbedder, write_documents};

    fn setup(name: &str) -> (VectorStore<HashEmbedder>, Chunker) {
        let conn = open_db_in_memory(name).unwrap();
        let store = VectorStore::open(conn, "rag_docs", HashEmbedder::new()).unwrap();
        let chunker = Chunker::new(ChunkStrategy::Sentence).unwrap();
        (store, chunker)
    }

    #[test]
    fn ingest_directory_indexes_every_passage() {
        let tmp = tempfile::tempdir().unwrap();
        write_documents(
            tmp.path(),
            &[
                ("sky.txt", "The sky is blue. Water is wet."),
                ("rust.txt", "Rust has ownership."),
                ("blank.txt", "   "),
            ],
        );
        let (mut store, chunker) = setup("ingest_dir");

        let report = ingest_directory(&mut store, &chunker, tmp.path()).unwrap();
        assert_eq!(
            report,
            IngestReport {
                indexed: 2,
                unchanged: 0,
                passages: 3,
            }
        );
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn re_ingestion_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        write_documents(
            tmp.path(),
            &[("a.txt", "One. Two. Three."), ("b.txt", "Four.")],
        );
        let (mut store, chunker) = setup("ingest_idempotent");

        ingest_directory(&mut store, &chunker, tmp.path()).unwrap();
        let once = store.count().unwrap();
        let calls_after_first = store.embedder_mut().calls();

        let report = ingest_directory(&mut store, &chunker, tmp.path()).unwrap();
        assert_eq!(store.count().unwrap(), once);
        assert_eq!(report.unchanged, 2);
        assert_eq!(report.indexed, 0);
        // Unchanged documents are not re-embedded.
        assert_eq!(store.embedder_mut().calls(), calls_after_first);
    }

    #[test]
    fn re_ingestion_across_process_restarts_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let data = tmp.path().join("data");
        write_documents(&data, &[("a.txt", "One. Two. Three.")]);
        let db_path = tmp.path().join(".docent").join("docent.db");
        let chunker = Chunker::new(ChunkStrategy::Sentence).unwrap();

        for _ in 0..2 {
            let conn = open_db(&db_path).unwrap();
            let mut store = VectorStore::open(conn, "rag_docs", HashEmbedder::new()).unwrap();
            ingest_directory(&mut store, &chunker, &data).unwrap();
            assert_eq!(store.count().unwrap(), 3);
            store.close().unwrap();
        }
    }

    #[test]
    fn changed_document_replaces_its_passages() {
        let (mut store, chunker) = setup("ingest_changed");

        let v1 = [Document::new("a.txt", "One. Two. Three.")];
        ingest_documents(&mut store, &chunker, &v1).unwrap();
        assert_eq!(store.count().unwrap(), 3);

        let v2 = [Document::new("a.txt", "Only one sentence now.")];
        let report = ingest_documents(&mut store, &chunker, &v2).unwrap();
        assert_eq!(report.indexed, 1);
        assert_eq!(store.count().unwrap(), 1);

        let results = store.query("sentence", 4).unwrap();
        assert_eq!(results[0].content, "Only one sentence now.");
    }

    #[test]
    fn changed_chunking_reindexes_unchanged_documents() {
        let (mut store, _) = setup("ingest_rechunk");
        let docs = [Document::new("a.txt", "One. Two. Three. Four.")];

        let window = Chunker::new(ChunkStrategy::default()).unwrap();
        ingest_documents(&mut store, &window, &docs).unwrap();
        assert_eq!(store.count().unwrap(), 1);

        let sentence = Chunker::new(ChunkStrategy::Sentence).unwrap();
        let report = ingest_documents(&mut store, &sentence, &docs).unwrap();
        assert_eq!(
            report,
            IngestReport {
                indexed: 1,
                unchanged: 0,
                passages: 4,
            }
        );
        assert_eq!(store.count().unwrap(), 4);

        // Same settings again: nothing to do.
        let report = ingest_documents(&mut store, &sentence, &docs).unwrap();
        assert_eq!(report.unchanged, 1);
        assert_eq!(store.count().unwrap(), 4);
    }

    #[test]
    fn missing_directory_is_ingestion_error() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut store, chunker) = setup("ingest_missing");
        let err = ingest_directory(&mut store, &chunker, &tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::Ingestion(_)));
    }

    #[test]
    fn embedding_failure_aborts_without_fingerprint() {
        let conn = open_db_in_memory("ingest_embed_fail").unwrap();
        let mut store = VectorStore::open(conn, "rag_docs", HashEmbedder::failing()).unwrap();
        let chunker = Chunker::new(ChunkStrategy::Sentence).unwrap();

        let docs = [Document::new("a.txt", "One.")];
        let err = ingest_documents(&mut store, &chunker, &docs).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(store.source_fingerprint("a.txt").unwrap().is_none());
    }
}
