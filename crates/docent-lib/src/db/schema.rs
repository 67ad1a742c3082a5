use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

/// Define all schema migrations.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE collections (
            name          TEXT PRIMARY KEY,
            dimension     INTEGER,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE sources (
            collection     TEXT NOT NULL REFERENCES collections(name),
            source         TEXT NOT NULL,
            content_hash   TEXT NOT NULL,
            passage_count  INTEGER NOT NULL,
            updated_at     TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (collection, source)
        );

        CREATE TABLE passages (
            id            TEXT PRIMARY KEY,
            collection    TEXT NOT NULL REFERENCES collections(name),
            source        TEXT NOT NULL,
            chunk_index   INTEGER NOT NULL,
            content       TEXT NOT NULL,
            embedding     BLOB NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(collection, source, chunk_index)
        );

        CREATE INDEX idx_passages_source
            ON passages(collection, source);",
    )])
}

/// Apply all pending migrations to the database.
pub fn apply_migrations(conn: &mut Connection) -> anyhow::Result<()> {
    migrations()
        .to_latest(conn)
        .map_err(|e| anyhow::anyhow!("Failed to apply migrations: {e}"))?;
    Ok(())
}
