pub mod catalog_import;
pub mod config;
pub mod error;
pub mod featured;
pub mod models;
pub mod storage;

pub use config::AppConfig;
pub use error::{OpenbooksError, Result};
pub use models::*;

pub use catalog_import::{CatalogCollection, ImportReport, import_collection, read_collection};
pub use featured::FeaturedBooks;
pub use storage::database::{ConnectionPool, Database, open_database, open_in_memory};
pub use storage::repositories::{
    BookCacheRepository, CategoryRepository, Repository, SqliteBookCacheRepository,
    SqliteCategoryRepository,
};
