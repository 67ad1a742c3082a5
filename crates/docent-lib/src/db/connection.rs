use std::path::Path;

use anyhow::Context;
use rusqlite::{Connection, OpenFlags};

use super::schema::apply_migrations;

/// Open a file-backed `SQLite` connection with the schema applied.
pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    init_connection(&mut conn)?;
    Ok(conn)
}

/// Open an in-memory `SQLite` connection with the schema applied.
///
/// Uses the `SQLite` URI format with shared-cache mode so multiple connections
/// can share the same named in-memory database within the same process.
/// The in-memory database persists as long as at least one connection to it remains open.
pub fn open_db_in_memory(name: &str) -> anyhow::Result<Connection> {
    let uri = format!("file:{name}?mode=memory&cache=shared");
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_SHARED_CACHE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let mut conn = Connection::open_with_flags(uri, flags)
        .with_context(|| format!("Failed to open in-memory database: {name}"))?;
    init_connection(&mut conn)?;
    Ok(conn)
}

/// Configure WAL mode and a busy timeout, then apply schema migrations.
fn init_connection(conn: &mut Connection) -> anyhow::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("Failed to enable WAL mode")?;
    conn.pragma_update(None, "busy_timeout", 5000)
        .context("Failed to set busy_timeout")?;
    apply_migrations(conn)?;
    Ok(())
}
