//! Document-grounded question answering: load text files, embed them into a
//! persistent vector collection, and answer questions from retrieved passages.

pub mod assistant;
pub mod config;
pub mod context;
pub mod db;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod safety;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use error::{Error, Result};
