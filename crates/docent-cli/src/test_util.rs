use docent_lib::db::connection::open_db_in_memory;
use docent_lib::pipeline::chunker::{ChunkStrategy, Chunker, Passage};
use docent_lib::store::VectorStore;
use docent_lib::test_util::HashEmbedder;

/// Empty store over a named shared-cache in-memory database.
pub fn store_in_memory(name: &str) -> VectorStore<HashEmbedder> {
    let conn = open_db_in_memory(name).unwrap();
    VectorStore::open(conn, "rag_docs", HashEmbedder::new()).unwrap()
}

/// Store holding two passages from `sky.txt`.
pub fn seeded_store(name: &str) -> VectorStore<HashEmbedder> {
    let mut store = store_in_memory(name);
    let passages = ["The sky is blue.", "Water is wet."]
        .iter()
        .enumerate()
        .map(|(index, text)| Passage {
            source: "sky.txt".to_string(),
            index,
            start: index * 17,
            text: (*text).to_string(),
        })
        .collect::<Vec<_>>();
    store.upsert(&passages).unwrap();
    store
}

pub fn sentence_chunker() -> Chunker {
    Chunker::new(ChunkStrategy::Sentence).unwrap()
}
