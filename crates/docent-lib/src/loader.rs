use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A plain-text document read from the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name the document was read from.
    pub source: String,
    /// Full UTF-8 text of the file.
    pub text: String,
}

impl Document {
    #[must_use]
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// Load every non-empty `.txt` file directly under `dir`, sorted by file name.
///
/// Whitespace-only and unreadable files are skipped with a warning. Only a
/// missing or unreadable directory fails the batch.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(Error::Ingestion(format!(
            "Data directory not found: {}",
            dir.display()
        )));
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        Error::Ingestion(format!(
            "Failed to read data directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut documents = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Failed to read directory entry, skipping");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !has_txt_extension(&path) {
            continue;
        }

        let source = entry.file_name().to_string_lossy().into_owned();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = %source, error = %e, "Failed to read document, skipping");
                continue;
            }
        };

        if text.trim().is_empty() {
            warn!(file = %source, "Skipping empty document");
            continue;
        }

        documents.push(Document { source, text });
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    debug!(count = documents.len(), dir = %dir.display(), "Loaded documents");

    Ok(documents)
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}
