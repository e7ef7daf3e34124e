use std::path::PathBuf;
use std::sync::Arc;

use openbooks_core::config::SearchConfig;
use openbooks_core::{AppConfig, BookRecord, Database, FeaturedBooks};
use openbooks_sources::Aggregator;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub db: Arc<Database>,
    pub search: SearchConfig,
    pub featured_path: PathBuf,
}

impl AppState {
    pub fn new(aggregator: Arc<Aggregator>, db: Arc<Database>, config: &AppConfig) -> Self {
        Self {
            aggregator,
            db,
            search: config.search.clone(),
            featured_path: config.featured_path(),
        }
    }

    /// Run a blocking cache operation off the async workers.
    pub async fn with_db<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> openbooks_core::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        Ok(tokio::task::spawn_blocking(move || op(&db)).await??)
    }

    /// Search every provider and store the results. A cache failure is logged, not returned.
    pub async fn search_and_cache(&self, query: &str, limit: usize) -> Vec<BookRecord> {
        let books = self.aggregator.search(query, limit).await;
        let batch = books.clone();
        match self.with_db(move |db| db.upsert_books(&batch)).await {
            Ok(stored) => debug!(%query, stored, "cached search results"),
            Err(err) => warn!(%query, error = %err, "failed to cache search results"),
        }
        books
    }

    /// Search a category name. Every merged record is returned; only the first `limit` are cached.
    pub async fn search_category(&self, name: &str, limit: usize) -> Vec<BookRecord> {
        let books = self.aggregator.search_all(name, limit).await;
        let batch: Vec<BookRecord> = books.iter().take(limit).cloned().collect();
        match self.with_db(move |db| db.upsert_books(&batch)).await {
            Ok(stored) => debug!(category = %name, stored, "cached category results"),
            Err(err) => warn!(category = %name, error = %err, "failed to cache category results"),
        }
        books
    }

    /// Featured collections from disk; a missing or broken file reads as empty.
    pub async fn featured(&self) -> FeaturedBooks {
        let path = self.featured_path.clone();
        match tokio::task::spawn_blocking(move || FeaturedBooks::load(&path)).await {
            Ok(Ok(featured)) => featured,
            Ok(Err(err)) => {
                warn!(path = %self.featured_path.display(), error = %err, "featured file unavailable");
                FeaturedBooks::default()
            }
            Err(err) => {
                warn!(error = %err, "featured file task failed");
                FeaturedBooks::default()
            }
        }
    }
}
