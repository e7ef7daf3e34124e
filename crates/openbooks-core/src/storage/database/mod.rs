mod connection;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use migrations::{Migration, get_applied_versions, run_migrations};
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use crate::error::{OpenbooksError, Result};
use crate::models::{BookRecord, CachedBook, Category};

use super::repositories::{
    BookCacheRepository, CategoryRepository, Repository, SqliteBookCacheRepository,
    SqliteCategoryRepository,
};

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// Local cache of book records and categories.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    fn books(&self) -> SqliteBookCacheRepository<'_> {
        SqliteBookCacheRepository::new(self.pool.get_connection())
    }

    fn categories(&self) -> SqliteCategoryRepository<'_> {
        SqliteCategoryRepository::new(self.pool.get_connection())
    }

    /// Upsert a batch of search results in one transaction.
    pub fn upsert_books(&self, books: &[BookRecord]) -> Result<usize> {
        let repo = self.books();
        let tx = repo.connection().unchecked_transaction()?;
        for book in books {
            repo.upsert(book)?;
        }
        tx.commit()?;
        Ok(books.len())
    }

    pub fn get_book(&self, id: &str) -> Result<BookRecord> {
        self.books()
            .find_by_id(&id.to_string())?
            .ok_or_else(|| OpenbooksError::BookNotFound(id.to_string()))
    }

    pub fn get_cached_book(&self, id: &str) -> Result<CachedBook> {
        self.books()
            .find_cached(id)?
            .ok_or_else(|| OpenbooksError::BookNotFound(id.to_string()))
    }

    pub fn list_by_source(&self, source: &str) -> Result<Vec<BookRecord>> {
        self.books().list_by_source(source)
    }

    /// Replace every row whose id starts with `id_prefix` by `books`.
    pub fn replace_collection(&self, id_prefix: &str, books: &[BookRecord]) -> Result<usize> {
        let repo = self.books();
        let tx = repo.connection().unchecked_transaction()?;
        repo.delete_by_id_prefix(id_prefix)?;
        for book in books {
            repo.save(book)?;
        }
        tx.commit()?;
        Ok(books.len())
    }

    pub fn count_books(&self) -> Result<usize> {
        self.books().count()
    }

    /// All categories, seeding the defaults into an empty table first.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let repo = self.categories();
        repo.seed_defaults()?;
        repo.list()
    }

    pub fn schema_versions(&self) -> Result<Vec<u32>> {
        let conn = self.pool.get_connection();
        get_applied_versions(&conn)
    }

    pub fn path(&self) -> Option<&str> {
        self.pool.path()
    }
}
