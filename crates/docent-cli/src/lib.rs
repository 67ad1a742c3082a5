pub mod cli;
pub mod commands;
pub mod logging;

#[cfg(test)]
pub mod test_util;

use std::io::{BufRead, Write};
use std::path::Path;

use clap::Parser;
use tracing::info;

use docent_lib::assistant::{Assistant, AssistantOptions};
use docent_lib::config::COLLECTION_NAME;
use docent_lib::context::DocentContext;
use docent_lib::db::connection::open_db;
use docent_lib::embedding::{Embed, Embedder};
use docent_lib::llm::{ChatCompletionsProvider, LlmProvider};
use docent_lib::output::ConsoleIO;
use docent_lib::pipeline::chunker::Chunker;
use docent_lib::store::VectorStore;

use cli::Cli;

/// Main CLI entry point. Parses args, validates the environment, builds the
/// embedding model, store and LLM client, then runs the interactive session.
pub fn try_run<IN, OUT, ERR>(
    args: &[&str],
    io: &mut dyn ConsoleIO<IN, OUT, ERR>,
) -> anyhow::Result<()>
where
    IN: BufRead,
    OUT: Write,
    ERR: Write,
{
    let cli = Cli::try_parse_from(args)?;

    let ctx = match &cli.root {
        Some(root) => DocentContext::new(root.clone()),
        None => DocentContext::from_cwd()?,
    }
    .with_dirs(cli.data_dir.clone(), cli.log_dir.clone());
    logging::init_logging(&ctx);

    let api_key = cli.require_api_key()?;
    if !ctx.data_dir().is_dir() {
        anyhow::bail!("Data directory not found: {}", ctx.data_dir().display());
    }

    let chunker = Chunker::new(cli.chunk_strategy())?;
    let provider = ChatCompletionsProvider::new(api_key, cli.model.clone(), &cli.base_url)?;
    let options = AssistantOptions {
        top_k: cli.top_k,
        temperature: cli.temperature,
        ..AssistantOptions::default()
    };

    info!(
        root = %ctx.root().display(),
        model = provider.model(),
        "Starting docent"
    );

    let embedder = Embedder::new(&ctx.model_cache_dir())?;
    let conn = open_db(&ctx.db_path())?;
    let store = VectorStore::open(conn, COLLECTION_NAME, embedder)?;

    run_with(store, provider, &chunker, options, ctx.data_dir(), io)
}

/// Ingest `data_dir` into `store`, answer questions until the user leaves,
/// then close the store.
pub fn run_with<E, P, IN, OUT, ERR>(
    store: VectorStore<E>,
    provider: P,
    chunker: &Chunker,
    options: AssistantOptions,
    data_dir: &Path,
    io: &mut dyn ConsoleIO<IN, OUT, ERR>,
) -> anyhow::Result<()>
where
    E: Embed,
    P: LlmProvider,
    IN: BufRead,
    OUT: Write,
    ERR: Write,
{
    let mut assistant = Assistant::new(store, provider, options)?;

    commands::ingest::run_startup_ingest(assistant.store_mut(), chunker, data_dir, io)?;
    commands::session::run_session(&mut assistant, io)?;

    assistant.into_store().close()?;
    Ok(())
}
