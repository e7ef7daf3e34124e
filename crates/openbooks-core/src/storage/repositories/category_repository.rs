use std::sync::MutexGuard;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::Category;

use super::Repository;

pub trait CategoryRepository: Repository<Entity = Category, Id = i64> {
    fn list(&self) -> Result<Vec<Category>>;
    /// Insert the default categories when the table is empty. Returns the number inserted.
    fn seed_defaults(&self) -> Result<usize>;
}

pub struct SqliteCategoryRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> SqliteCategoryRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            adult: row.get(3)?,
        })
    }
}

impl<'a> Repository for SqliteCategoryRepository<'a> {
    type Entity = Category;
    type Id = i64;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name, color, adult FROM categories WHERE id = ?1",
                params![id],
                Self::row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    fn save(&self, category: &Self::Entity) -> Result<()> {
        self.conn.execute(
            "INSERT INTO categories (name, color, adult) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET color = excluded.color, adult = excluded.adult",
            params![category.name, category.color, category.adult],
        )?;
        Ok(())
    }
}

impl<'a> CategoryRepository for SqliteCategoryRepository<'a> {
    fn list(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, adult FROM categories ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn seed_defaults(&self) -> Result<usize> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let defaults = Category::defaults();
        for category in &defaults {
            self.save(category)?;
        }
        Ok(defaults.len())
    }
}
