//! Featured collections served on the front page.
//!
//! Stored as a JSON file `{"destaques": [...], "fantasy": [...]}` produced by
//! exporting the CSV-imported collections out of the cache.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog_import::CatalogCollection;
use crate::error::Result;
use crate::models::BookRecord;
use crate::storage::database::Database;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturedBooks {
    #[serde(rename = "destaques", default)]
    pub featured: Vec<BookRecord>,

    #[serde(default)]
    pub fantasy: Vec<BookRecord>,
}

impl FeaturedBooks {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Collect both imported collections from the cache.
    pub fn from_database(db: &Database) -> Result<Self> {
        Ok(Self {
            featured: db.list_by_source(CatalogCollection::Featured.source())?,
            fantasy: db.list_by_source(CatalogCollection::Fantasy.source())?,
        })
    }

    pub fn featured_head(&self, limit: usize) -> Vec<BookRecord> {
        self.featured.iter().take(limit).cloned().collect()
    }

    pub fn fantasy_head(&self, limit: usize) -> Vec<BookRecord> {
        self.fantasy.iter().take(limit).cloned().collect()
    }
}
