//! Question answering over the vector store.
//!
//! Per query: safety check, retrieval, prompt assembly, one generation call.
//! Every outcome is an [`Answer`]; failures become a generic apology so the
//! caller's loop keeps running.

use std::fmt::Write as _;

use tracing::{debug, error, warn};

use crate::config::{
    DEFAULT_MAX_COMPLETION_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_K, GENERATION_FAILURE_MESSAGE,
    NO_CONTEXT_MESSAGE,
};
use crate::embedding::Embed;
use crate::error::Error;
use crate::llm::{LlmProvider, ProviderRequest};
use crate::safety::{self, SafetyVerdict};
use crate::store::{ScoredPassage, VectorStore};

/// Instruction sent as the system message of every generation call.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that answers questions \
     about a collection of documents. Answer only using the provided context. If the context \
     is insufficient to answer, say so.";

/// Terminal state of one query.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Blocked by the safety filter; carries the fallback message.
    Rejected { reason: &'static str, message: String },
    /// Retrieval found nothing to ground an answer on.
    NoContext(String),
    /// The model's answer.
    Answered(String),
    /// Retrieval or generation failed; carries a generic message.
    Failed(String),
}

impl Answer {
    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            Self::NoContext(text) | Self::Answered(text) | Self::Failed(text) => text,
        }
    }
}

/// Generation parameters for the assistant.
#[derive(Debug, Clone, Copy)]
pub struct AssistantOptions {
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
        }
    }
}

/// Retrieval-augmented assistant bound to one store and one provider.
pub struct Assistant<E: Embed, P: LlmProvider> {
    store: VectorStore<E>,
    provider: P,
    options: AssistantOptions,
}

impl<E: Embed, P: LlmProvider> Assistant<E, P> {
    /// `options.top_k` must be greater than zero.
    pub fn new(store: VectorStore<E>, provider: P, options: AssistantOptions) -> Result<Self, Error> {
        if options.top_k == 0 {
            return Err(Error::InvalidArgument(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            store,
            provider,
            options,
        })
    }

    pub fn store_mut(&mut self) -> &mut VectorStore<E> {
        &mut self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Release the store so the caller can close it.
    pub fn into_store(self) -> VectorStore<E> {
        self.store
    }

    /// Answer one query.
    pub fn ask(&mut self, query: &str) -> Answer {
        if let SafetyVerdict::Rejected { reason, fallback } = safety::check(query) {
            return Answer::Rejected {
                reason,
                message: fallback.to_string(),
            };
        }

        let passages = match self.store.query(query, self.options.top_k) {
            Ok(passages) => passages,
            Err(e) => {
                error!(error = %e, "Retrieval failed");
                return Answer::Failed(GENERATION_FAILURE_MESSAGE.to_string());
            }
        };
        if passages.is_empty() {
            warn!("No passages retrieved; answering without the model");
            return Answer::NoContext(NO_CONTEXT_MESSAGE.to_string());
        }
        debug!(retrieved = passages.len(), "Retrieved passages");

        let prompt = build_prompt(query, &passages);
        let request = ProviderRequest {
            system: SYSTEM_INSTRUCTION,
            prompt: &prompt,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };

        match self.provider.answer(&request) {
            Ok(answer) => Answer::Answered(answer),
            Err(e) => {
                let e = Error::Generation(e);
                error!(error = %e, "Generation failed");
                Answer::Failed(GENERATION_FAILURE_MESSAGE.to_string())
            }
        }
    }
}

/// Assemble the user prompt: numbered context blocks, the question, guidelines.
pub fn build_prompt(question: &str, passages: &[ScoredPassage]) -> String {
    let mut prompt = String::from("Context:\n");
    for (i, passage) in passages.iter().enumerate() {
        if i > 0 {
            prompt.push_str("---\n");
        }
        let _ = writeln!(
            prompt,
            "[{}] ({} #{})\n{}",
            i + 1,
            passage.source,
            passage.chunk_index,
            passage.content.trim()
        );
    }
    let _ = write!(
        prompt,
        "\nQuestion: {}\n\nGuidelines:\n\
         - Use only the context above.\n\
         - If the answer is not in the context, reply: \"{NO_CONTEXT_MESSAGE}\"\n",
        question.trim()
    );
    prompt
}
