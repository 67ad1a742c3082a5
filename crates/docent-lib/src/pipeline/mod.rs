pub mod chunker;
pub mod ingest;
