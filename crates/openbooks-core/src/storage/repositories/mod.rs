mod book_cache_repository;
mod category_repository;

pub use book_cache_repository::{BookCacheRepository, SqliteBookCacheRepository};
pub use category_repository::{CategoryRepository, SqliteCategoryRepository};

use crate::error::Result;

pub trait Repository {
    type Entity;
    type Id;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn save(&self, entity: &Self::Entity) -> Result<()>;
}
