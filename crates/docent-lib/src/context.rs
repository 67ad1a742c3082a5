use std::path::{Path, PathBuf};

/// Filesystem layout for a docent installation.
#[derive(Clone, Debug)]
pub struct DocentContext {
    /// Root directory that owns the `.docent/` state directory.
    root: PathBuf,
    /// Directory scanned for `.txt` documents.
    data_dir: PathBuf,
    log_dir: Option<PathBuf>,
}

impl DocentContext {
    /// Create a context rooted at `root` with the default `<root>/data`
    /// documents directory and no log directory.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            data_dir: root.join("data"),
            root,
            log_dir: None,
        }
    }

    /// Override the documents directory and the log directory.
    ///
    /// A `None` data directory keeps the current one.
    #[must_use]
    pub fn with_dirs(mut self, data_dir: Option<PathBuf>, log_dir: Option<PathBuf>) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        self.log_dir = log_dir;
        self
    }

    /// Create a context from the current working directory.
    pub fn from_cwd() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(cwd))
    }

    /// Root directory of the installation.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the plain-text documents to ingest.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Optional parent directory for log file output.
    /// When set, operational logs are written to JSONL files under this path.
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Path to the `.docent/` state directory.
    /// Default: `<root>/.docent/`
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(".docent")
    }

    /// Path to the `SQLite` database holding the vector collection.
    /// Default: `<root>/.docent/docent.db`
    pub fn db_path(&self) -> PathBuf {
        self.state_dir().join("docent.db")
    }

    /// Cache directory for downloaded embedding model files.
    /// Default: `<root>/.docent/models`
    pub fn model_cache_dir(&self) -> PathBuf {
        self.state_dir().join("models")
    }
}
