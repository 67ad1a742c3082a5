use std::path::Path;

use anyhow::Context;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use tracing::debug;

use crate::config::EMBEDDING_DIMENSION;

/// Text embedding backend used by the vector store.
pub trait Embed {
    /// Embed a batch of text strings and return one vector per input, in order.
    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Length of every vector this backend produces.
    fn dimension(&self) -> usize;
}

/// Wrapper around fastembed's `TextEmbedding` model.
/// Uses sentence-transformers all-MiniLM-L6-v2, downloaded on first use.
pub struct Embedder {
    model: TextEmbedding,
}

impl Embedder {
    /// Load the embedding model, caching downloaded files under `cache_dir`.
    pub fn new(cache_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(cache_dir).with_context(|| {
            format!("Failed to create model cache: {}", cache_dir.display())
        })?;

        let options = TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false);
        let model =
            TextEmbedding::try_new(options).context("Failed to initialize embedding model")?;
        debug!(cache_dir = %cache_dir.display(), "Embedding model loaded");

        Ok(Self { model })
    }
}

impl Embed for Embedder {
    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        let embeddings = self
            .model
            .embed(texts, None)
            .context("Failed to embed texts")?;
        anyhow::ensure!(
            embeddings.len() == texts.len(),
            "Embedding count mismatch: expected {}, got {}",
            texts.len(),
            embeddings.len()
        );
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These exercise the real ONNX model and need network access on first run.

    #[test]
    #[ignore = "downloads the embedding model"]
    fn embed_batch_returns_correct_count() {
        let tmp = tempfile::tempdir().unwrap();
        let mut embedder = Embedder::new(tmp.path()).unwrap();
        let embeddings = embedder.embed_batch(&["hello world", "how are you"]).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), EMBEDDING_DIMENSION);
        assert_eq!(embeddings[1].len(), EMBEDDING_DIMENSION);
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn related_texts_are_closer() {
        let tmp = tempfile::tempdir().unwrap();
        let mut embedder = Embedder::new(tmp.path()).unwrap();
        let v = embedder
            .embed_batch(&["The sky is blue.", "What colour is the sky?", "Tax law"])
            .unwrap();
        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&v[0], &v[1]) > dot(&v[0], &v[2]));
    }
}
