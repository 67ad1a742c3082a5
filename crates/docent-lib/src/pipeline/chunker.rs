use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use text_splitter::{Characters, ChunkConfig, TextSplitter};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::{CHUNK_OVERLAP_CHARS, CHUNK_SIZE_CHARS};
use crate::error::{Error, Result};
use crate::loader::Document;

/// A blank line, possibly padded with spaces or tabs, plus any further blank lines.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("static regex"));

/// Where passage boundaries fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// Fixed-size character windows; adjacent windows share up to `overlap` characters.
    Window { size: usize, overlap: usize },
    /// One passage per Unicode sentence.
    Sentence,
    /// One passage per blank-line separated paragraph.
    Paragraph,
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self::Window {
            size: CHUNK_SIZE_CHARS,
            overlap: CHUNK_OVERLAP_CHARS,
        }
    }
}

/// Stable label recorded with each source fingerprint, so a run with other
/// chunking settings re-indexes the document.
impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window { size, overlap } => write!(f, "window:{size}:{overlap}"),
            Self::Sentence => f.write_str("sentence"),
            Self::Paragraph => f.write_str("paragraph"),
        }
    }
}

/// A contiguous span of a document, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    /// Source file name of the parent document.
    pub source: String,
    /// Sequential passage index within the document (0-based).
    pub index: usize,
    /// Byte offset of `text` in the parent document.
    pub start: usize,
    /// The passage text, untrimmed.
    pub text: String,
}

/// Splits documents into passages according to a [`ChunkStrategy`].
pub struct Chunker {
    strategy: ChunkStrategy,
    window: Option<TextSplitter<Characters>>,
}

impl Chunker {
    /// Build a chunker. Window strategies require `0 < overlap < size`
    /// or `overlap == 0` with `size > 0`.
    pub fn new(strategy: ChunkStrategy) -> Result<Self> {
        let window = match strategy {
            ChunkStrategy::Window { size, overlap } => {
                if size == 0 {
                    return Err(Error::InvalidArgument(
                        "chunk size must be greater than zero".to_string(),
                    ));
                }
                let config = ChunkConfig::new(size)
                    .with_overlap(overlap)
                    .map_err(|e| Error::InvalidArgument(e.to_string()))?
                    .with_trim(false);
                Some(TextSplitter::new(config))
            }
            ChunkStrategy::Sentence | ChunkStrategy::Paragraph => None,
        };
        Ok(Self { strategy, window })
    }

    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// Lazily split `doc` into passages. Whitespace-only spans are dropped
    /// and do not consume an index. Calling again restarts from the top.
    pub fn chunk<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = Passage> + 'a {
        let text = doc.text.as_str();
        let spans: Box<dyn Iterator<Item = (usize, &'a str)> + 'a> = match &self.window {
            Some(splitter) => Box::new(splitter.chunk_indices(text)),
            None if self.strategy == ChunkStrategy::Sentence => {
                Box::new(text.split_sentence_bound_indices())
            }
            None => Box::new(paragraph_spans(text)),
        };

        spans
            .filter(|(_, span)| !span.trim().is_empty())
            .enumerate()
            .map(move |(index, (start, span))| Passage {
                source: doc.source.clone(),
                index,
                start,
                text: span.to_string(),
            })
    }
}

/// Paragraph spans; the separating blank lines stay with the preceding paragraph.
fn paragraph_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut cursor = 0;
    let mut breaks = PARAGRAPH_BREAK.find_iter(text);
    std::iter::from_fn(move || {
        if cursor >= text.len() {
            return None;
        }
        let start = cursor;
        cursor = breaks.next().map_or(text.len(), |m| m.end());
        Some((start, &text[start..cursor]))
    })
}
