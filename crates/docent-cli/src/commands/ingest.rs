use std::io::{BufRead, Write};
use std::path::Path;

use tracing::warn;

use docent_lib::embedding::Embed;
use docent_lib::output::ConsoleIO;
use docent_lib::pipeline::chunker::Chunker;
use docent_lib::pipeline::ingest::{IngestReport, ingest_directory};
use docent_lib::store::VectorStore;

/// Index the documents directory before the first question.
///
/// Prints a one-line summary to stderr. An empty collection is reported but
/// does not stop the session; questions then get the no-information answer.
pub fn run_startup_ingest<E, IN, OUT, ERR>(
    store: &mut VectorStore<E>,
    chunker: &Chunker,
    data_dir: &Path,
    io: &mut dyn ConsoleIO<IN, OUT, ERR>,
) -> anyhow::Result<IngestReport>
where
    E: Embed,
    IN: BufRead,
    OUT: Write,
    ERR: Write,
{
    writeln!(io.stderr(), "Indexing documents in {} ...", data_dir.display())?;

    let report = ingest_directory(store, chunker, data_dir)?;
    let available = store.count()?;

    writeln!(
        io.stderr(),
        "Indexed {} documents ({} unchanged, {} passages written); {} passages available.",
        report.indexed,
        report.unchanged,
        report.passages,
        available,
    )?;

    if available == 0 {
        warn!(data_dir = %data_dir.display(), "No passages indexed");
        writeln!(
            io.stderr(),
            "Warning: no documents found in {}; answers will have no context.",
            data_dir.display()
        )?;
    }

    Ok(report)
}
