use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use docent_lib::context::DocentContext;

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "DOCENT_LOG";

/// Days of JSONL log files kept per installation.
const LOG_RETENTION_DAYS: i32 = 28;

/// Install the global tracing subscriber.
///
/// With a log directory, events go to `<log_dir>/<root name>-<digest>/<date>.jsonl`
/// at `info` and above. Without one, `warn` and above go to stderr. Both honour
/// `DOCENT_LOG`. Initialization failures are ignored; logging never stops the
/// assistant from running.
pub fn init_logging(ctx: &DocentContext) {
    let _ = match ctx.log_dir() {
        Some(log_dir) => try_init_file_logging(log_dir, ctx.root()),
        None => try_init_stderr_logging(),
    };
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

fn try_init_stderr_logging() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter("warn"))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

fn try_init_file_logging(log_dir: &Path, root: &Path) -> anyhow::Result<()> {
    let dir = installation_log_dir(log_dir, root);
    fs::create_dir_all(&dir)?;

    let today = jiff::Zoned::now().date();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("{today}.jsonl")))?;

    tracing_subscriber::registry()
        .with(filter("info"))
        .with(fmt::layer().json().with_writer(Mutex::new(file)))
        .try_init()?;

    prune_old_logs(&dir, today);

    Ok(())
}

/// Per-installation log directory: the root's basename plus the first
/// 8 hex characters of the SHA-256 of its full path, so two roots with the
/// same name do not share files.
pub fn installation_log_dir(log_dir: &Path, root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map_or_else(|| "root".to_string(), |n| n.to_string_lossy().into_owned());

    let digest = Sha256::digest(root.to_string_lossy().as_bytes());
    let short: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();

    log_dir.join(format!("{name}-{short}"))
}

/// Delete `<date>.jsonl` files older than the retention window. Errors are ignored.
fn prune_old_logs(dir: &Path, today: jiff::civil::Date) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for path in entries.flatten().map(|entry| entry.path()) {
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let Some(date) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<jiff::civil::Date>().ok())
        else {
            continue;
        };
        if let Ok(age) = today.since(date)
            && age.get_days() >= LOG_RETENTION_DAYS
        {
            let _ = fs::remove_file(&path);
        }
    }
}
