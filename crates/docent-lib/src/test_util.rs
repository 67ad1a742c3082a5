//! Deterministic test doubles for the embedding and generation backends.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::embedding::Embed;
use crate::llm::{LlmProvider, ProviderRequest};

/// Bag-of-words embedder: each lowercase word is hashed into a bucket.
/// Texts sharing words are close under cosine similarity.
pub struct HashEmbedder {
    dimension: usize,
    calls: usize,
    fail: bool,
}

impl HashEmbedder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimension(64)
    }

    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            calls: 0,
            fail: false,
        }
    }

    /// An embedder whose every call fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Number of `embed_batch` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = usize::try_from(hasher.finish() % self.dimension as u64).unwrap_or(0);
            vector[bucket] += 1.0;
        }
        // Keep word-less texts off the zero vector.
        vector[self.dimension - 1] += 1e-3;
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embed for HashEmbedder {
    fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls += 1;
        anyhow::ensure!(!self.fail, "embedding backend unavailable");
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// LLM provider that replays a fixed answer (or failure) and records prompts.
pub struct ScriptedProvider {
    reply: Result<String, String>,
    prompts: RefCell<Vec<String>>,
    calls: Cell<usize>,
}

impl ScriptedProvider {
    /// Always answer with `reply`.
    #[must_use]
    pub fn answering(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: RefCell::new(Vec::new()),
            calls: Cell::new(0),
        }
    }

    /// Always fail with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: RefCell::new(Vec::new()),
            calls: Cell::new(0),
        }
    }

    /// Number of generation calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn answer(&self, request: &ProviderRequest) -> anyhow::Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.prompts.borrow_mut().push(request.prompt.to_string());
        self.reply.clone().map_err(anyhow::Error::msg)
    }
}

/// Write `(file name, contents)` pairs into `dir`.
pub fn write_documents(dir: &Path, files: &[(&str, &str)]) {
    std::fs::create_dir_all(dir).unwrap();
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}
