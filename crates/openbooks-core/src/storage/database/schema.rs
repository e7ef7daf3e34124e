use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books_cache (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            author       TEXT,
            language     TEXT,
            source       TEXT NOT NULL,
            download_url TEXT,
            preview_url  TEXT,
            cover_url    TEXT,
            summary      TEXT,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            name   TEXT UNIQUE NOT NULL,
            color  TEXT,
            adult  INTEGER NOT NULL DEFAULT 0
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_books_cache_source   ON books_cache(source);
        CREATE INDEX IF NOT EXISTS idx_books_cache_title    ON books_cache(title);
        CREATE INDEX IF NOT EXISTS idx_books_cache_author   ON books_cache(author);
        CREATE INDEX IF NOT EXISTS idx_books_cache_language ON books_cache(language);
        ",
    )?;
    Ok(())
}
