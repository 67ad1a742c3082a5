pub mod ingest;
pub mod session;
