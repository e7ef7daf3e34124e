pub mod annas_archive;
pub mod gutenberg;
pub mod internet_archive;
pub mod openlibrary;

use async_trait::async_trait;
use openbooks_core::BookRecord;

use crate::error::Result;

pub use annas_archive::AnnasArchiveSource;
pub use gutenberg::GutenbergSource;
pub use internet_archive::InternetArchiveSource;
pub use openlibrary::OpenLibrarySource;

/// A searchable source of book records.
#[async_trait]
pub trait BookProvider: Send + Sync {
    /// Display name, also stored as `BookRecord::source`.
    fn name(&self) -> &'static str;

    /// Search for `query`, returning at most `limit` records.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<BookRecord>>;
}
