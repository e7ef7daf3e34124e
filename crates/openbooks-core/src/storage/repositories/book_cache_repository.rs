use std::sync::MutexGuard;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::{BookRecord, CachedBook, UNKNOWN_AUTHOR};

use super::Repository;

pub trait BookCacheRepository: Repository<Entity = BookRecord, Id = String> {
    /// Insert new ids; for existing ids overwrite `title` and `cover_url` only.
    fn upsert(&self, book: &BookRecord) -> Result<()>;
    fn find_cached(&self, id: &str) -> Result<Option<CachedBook>>;
    fn list_by_source(&self, source: &str) -> Result<Vec<BookRecord>>;
    fn delete_by_id_prefix(&self, prefix: &str) -> Result<usize>;
    fn count(&self) -> Result<usize>;
}

pub struct SqliteBookCacheRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

const SELECT_COLUMNS: &str = "id, title, author, language, source, download_url, preview_url,
                              cover_url, summary, created_at";

impl<'a> SqliteBookCacheRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    /// Access the guarded connection, e.g. to open a transaction.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<BookRecord> {
        Ok(BookRecord {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row
                .get::<_, Option<String>>(2)?
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            language: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            source: row.get(4)?,
            download_url: row.get(5)?,
            preview_url: row.get(6)?,
            cover_url: row.get(7)?,
            summary: row.get(8)?,
        })
    }

    fn row_to_cached(row: &rusqlite::Row) -> rusqlite::Result<CachedBook> {
        let created_str: String = row.get(9)?;
        let created_at = DateTime::parse_from_rfc3339(&created_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();
        Ok(CachedBook {
            book: Self::row_to_book(row)?,
            created_at,
        })
    }
}

impl<'a> Repository for SqliteBookCacheRepository<'a> {
    type Entity = BookRecord;
    type Id = String;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        Ok(self.find_cached(id)?.map(|cached| cached.book))
    }

    /// Insert or fully replace the row.
    fn save(&self, book: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO books_cache
                (id, title, author, language, source, download_url, preview_url,
                 cover_url, summary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                book.id,
                book.title,
                book.author,
                book.language,
                book.source,
                book.download_url,
                book.preview_url,
                book.cover_url,
                book.summary,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl<'a> BookCacheRepository for SqliteBookCacheRepository<'a> {
    fn upsert(&self, book: &BookRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO books_cache
                (id, title, author, language, source, download_url, preview_url,
                 cover_url, summary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                cover_url = excluded.cover_url",
            params![
                book.id,
                book.title,
                book.author,
                book.language,
                book.source,
                book.download_url,
                book.preview_url,
                book.cover_url,
                book.summary,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn find_cached(&self, id: &str) -> Result<Option<CachedBook>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM books_cache WHERE id = ?1");
        let cached = self
            .conn
            .query_row(&sql, params![id], Self::row_to_cached)
            .optional()?;
        Ok(cached)
    }

    fn list_by_source(&self, source: &str) -> Result<Vec<BookRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM books_cache WHERE source = ?1 ORDER BY rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![source], Self::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn delete_by_id_prefix(&self, prefix: &str) -> Result<usize> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let deleted = self.conn.execute(
            "DELETE FROM books_cache WHERE id LIKE ?1 ESCAPE '\\'",
            params![format!("{escaped}%")],
        )?;
        Ok(deleted)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
