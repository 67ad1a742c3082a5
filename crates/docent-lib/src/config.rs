/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Name of the persistent collection holding indexed passages.
pub const COLLECTION_NAME: &str = "rag_docs";

/// Default window size, in characters, for fixed-size chunking.
pub const CHUNK_SIZE_CHARS: usize = 1000;

/// Number of characters shared by adjacent windows.
pub const CHUNK_OVERLAP_CHARS: usize = 200;

/// Default number of passages retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Default chat model served by the Groq endpoint.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";

/// OpenAI-compatible base URL of the Groq API.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Sampling temperature used for answers.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Maximum number of completion tokens requested per answer.
pub const DEFAULT_MAX_COMPLETION_TOKENS: usize = 512;

/// HTTP timeout for a single generation call, in seconds.
pub const LLM_TIMEOUT_SECS: u64 = 60;

/// Answer returned when retrieval finds nothing to ground a response on.
pub const NO_CONTEXT_MESSAGE: &str = "I don't have this information.";

/// Answer returned when the generation backend fails.
pub const GENERATION_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't generate an answer right now. Please try again in a moment.";
