use std::collections::BTreeMap;

use async_trait::async_trait;
use openbooks_core::{BookRecord, UNKNOWN_AUTHOR};
use serde::Deserialize;
use tracing::debug;

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::http::{HttpClient, join_url};
use crate::sources::BookProvider;

pub const SOURCE_NAME: &str = "Project Gutenberg";

const EPUB: &str = "application/epub+zip";
const HTML: &str = "text/html";
const JPEG: &str = "image/jpeg";

#[derive(Debug, Deserialize)]
struct GutendexPage {
    #[serde(default)]
    results: Vec<GutendexBook>,
}

#[derive(Debug, Deserialize)]
struct GutendexBook {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Vec<GutendexPerson>,
    #[serde(default)]
    formats: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct GutendexPerson {
    name: String,
}

impl GutendexBook {
    fn into_record(self) -> Option<BookRecord> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;

        let author = if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let download_url = self
            .formats
            .get(EPUB)
            .or_else(|| self.formats.get(HTML))
            .cloned();
        let preview_url = self.formats.get(HTML).cloned();
        let cover_url = self.formats.get(JPEG).cloned();
        let summary = format!(
            "Público e gratuito no Projeto Gutenberg. Formatos disponíveis: {}",
            self.formats.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        );

        Some(
            BookRecord::new(format!("gutenberg_{}", self.id), title, SOURCE_NAME)
                .with_author(author)
                .with_language("pt")
                .with_links(download_url, preview_url)
                .with_cover(cover_url)
                .with_summary(Some(summary)),
        )
    }
}

/// Gutendex, the JSON API over the Project Gutenberg catalog.
pub struct GutenbergSource {
    client: HttpClient,
    base_url: String,
}

impl GutenbergSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let endpoint = &config.gutenberg;
        Ok(Self {
            client: HttpClient::new(endpoint.timeout, &config.user_agent)?,
            base_url: endpoint.base_url.clone(),
        })
    }
}

#[async_trait]
impl BookProvider for GutenbergSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<BookRecord>> {
        let url = join_url(&self.base_url, "books/")?;
        let page: GutendexPage = self
            .client
            .get_json(url.as_str(), &[("search", query), ("languages", "pt")])
            .await?;

        let records: Vec<BookRecord> = page
            .results
            .into_iter()
            .take(limit)
            .filter_map(GutendexBook::into_record)
            .collect();
        debug!(source = SOURCE_NAME, %query, count = records.len(), "search finished");
        Ok(records)
    }
}
