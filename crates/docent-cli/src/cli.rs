use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use docent_lib::config::{
    CHUNK_OVERLAP_CHARS, CHUNK_SIZE_CHARS, DEFAULT_CHAT_MODEL, DEFAULT_LLM_BASE_URL,
    DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
};
use docent_lib::pipeline::chunker::ChunkStrategy;

#[derive(Parser, Debug)]
#[command(
    name = "docent",
    about = "Ask questions about a folder of text documents, answered by an LLM from retrieved passages"
)]
pub struct Cli {
    /// Directory that holds the `.docent/` state (defaults to the working directory)
    #[arg(long, env = "DOCENT_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory of `.txt` documents to index (defaults to `<root>/data`)
    #[arg(long, env = "DOCENT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory for JSONL operational logs
    #[arg(long, env = "DOCENT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Number of passages retrieved per question
    #[arg(long, env = "DOCENT_TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// How documents are split into passages
    #[arg(long, value_enum, default_value_t = Chunking::Window)]
    pub chunking: Chunking,

    /// Window size in characters (window chunking only)
    #[arg(long, default_value_t = CHUNK_SIZE_CHARS)]
    pub chunk_size: usize,

    /// Characters shared by adjacent windows (window chunking only)
    #[arg(long, default_value_t = CHUNK_OVERLAP_CHARS)]
    pub chunk_overlap: usize,

    /// Chat model used for answers
    #[arg(long, env = "DOCENT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "DOCENT_LLM_BASE_URL", default_value = DEFAULT_LLM_BASE_URL)]
    pub base_url: String,

    /// Sampling temperature for answers
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// API key for the LLM service
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Passage boundary selection on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Chunking {
    /// Fixed-size character windows with overlap.
    Window,
    /// One passage per sentence.
    Sentence,
    /// One passage per paragraph.
    Paragraph,
}

impl Cli {
    /// Chunking strategy described by the chunking flags.
    pub fn chunk_strategy(&self) -> ChunkStrategy {
        match self.chunking {
            Chunking::Window => ChunkStrategy::Window {
                size: self.chunk_size,
                overlap: self.chunk_overlap,
            },
            Chunking::Sentence => ChunkStrategy::Sentence,
            Chunking::Paragraph => ChunkStrategy::Paragraph,
        }
    }

    /// The API key, or an error when it is missing or blank.
    pub fn require_api_key(&self) -> anyhow::Result<String> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => anyhow::bail!("GROQ_API_KEY not found in environment variables."),
        }
    }
}
