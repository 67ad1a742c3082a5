//! Error taxonomy shared by the library API.
//!
//! Internals build `anyhow` chains with `.context(...)`; each public
//! component wraps them into the variant that names its failure class.
//! The variant's message renders the whole chain, so it carries no `source()`.

use thiserror::Error;

/// Failures surfaced by docent components.
#[derive(Debug, Error)]
pub enum Error {
    /// The data directory or a document could not be read.
    #[error("ingestion failed: {0}")]
    Ingestion(String),

    /// The vector database was unreachable or rejected a write.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),

    /// The embedding model failed to load or to embed.
    #[error("embedding error: {0:#}")]
    Embedding(anyhow::Error),

    /// The LLM inference call failed.
    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),

    /// A caller passed an argument outside the accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Library result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Adds failure-class conversions to `anyhow` results.
pub trait ResultExt<T> {
    /// Tag the error as a storage failure.
    fn storage_err(self) -> Result<T>;

    /// Tag the error as an embedding failure.
    fn embedding_err(self) -> Result<T>;
}

impl<T> ResultExt<T> for anyhow::Result<T> {
    fn storage_err(self) -> Result<T> {
        self.map_err(Error::Storage)
    }

    fn embedding_err(self) -> Result<T> {
        self.map_err(Error::Embedding)
    }
}
