//! Import of curated collections from a "Best Books Ever" style CSV export.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BookRecord, UNKNOWN_AUTHOR};
use crate::storage::database::Database;

/// Maximum number of rows kept per collection.
pub const MAX_COLLECTION_SIZE: usize = 30;

const ACCEPTED_LANGUAGES: &[&str] = &["portuguese", "pt", "pt-br"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCollection {
    /// General front-page picks.
    Featured,
    /// Fantasy picks.
    Fantasy,
}

impl CatalogCollection {
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Featured => "CSV_DESTAQUE_",
            Self::Fantasy => "CSV_FANTASY_",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Self::Featured => "csv_destaques",
            Self::Fantasy => "csv_best_books",
        }
    }

    fn accepts(self, row: &CatalogRow) -> bool {
        let language = row.language.trim().to_lowercase();
        if !ACCEPTED_LANGUAGES.contains(&language.as_str()) {
            return false;
        }
        if row.usable_cover().is_none() || row.title.trim().is_empty() {
            return false;
        }
        match self {
            Self::Featured => true,
            Self::Fantasy => row.genres.to_lowercase().contains("fantasy"),
        }
    }
}

impl std::str::FromStr for CatalogCollection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "featured" | "destaques" => Ok(Self::Featured),
            "fantasy" => Ok(Self::Fantasy),
            other => Err(format!("unknown collection: {other}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "bookId", default)]
    book_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: String,
    #[serde(default)]
    genres: String,
    #[serde(rename = "coverImg", default)]
    cover_img: Option<String>,
}

impl CatalogRow {
    fn usable_cover(&self) -> Option<&str> {
        self.cover_img
            .as_deref()
            .map(str::trim)
            .filter(|c| *c != "NaN" && c.contains("http"))
    }

    fn into_record(self, collection: CatalogCollection) -> BookRecord {
        let local_id = self
            .book_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let title = self.title.trim().to_string();
        let search_link = format!("/?q={title}");
        let cover = self.usable_cover().map(ToOwned::to_owned);
        let author = self
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        BookRecord::new(
            format!("{}{local_id}", collection.id_prefix()),
            title,
            collection.source(),
        )
        .with_author(author)
        .with_language("pt")
        .with_links(Some(search_link.clone()), Some(search_link))
        .with_cover(cover)
        .with_summary(self.description.filter(|d| !d.trim().is_empty()))
    }
}

/// Outcome of reading a catalog file.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub rows_scanned: usize,
    pub rows_malformed: usize,
    pub books: Vec<BookRecord>,
}

/// Read up to [`MAX_COLLECTION_SIZE`] qualifying rows for `collection`.
pub fn read_collection<R: Read>(reader: R, collection: CatalogCollection) -> Result<ImportReport> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut report = ImportReport::default();

    for row in csv_reader.deserialize::<CatalogRow>() {
        report.rows_scanned += 1;
        let row = match row {
            Ok(row) => row,
            Err(_) => {
                report.rows_malformed += 1;
                continue;
            }
        };
        if collection.accepts(&row) {
            report.books.push(row.into_record(collection));
        }
        if report.books.len() >= MAX_COLLECTION_SIZE {
            break;
        }
    }

    Ok(report)
}

/// Read `path` and replace the collection in the cache when any row qualifies.
pub fn import_collection(
    db: &Database,
    path: &Path,
    collection: CatalogCollection,
) -> Result<ImportReport> {
    let file = std::fs::File::open(path)?;
    let report = read_collection(file, collection)?;
    if !report.books.is_empty() {
        db.replace_collection(collection.id_prefix(), &report.books)?;
    }
    Ok(report)
}
