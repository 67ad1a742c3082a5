pub mod embedder;

pub use embedder::{Embed, Embedder};
