use async_trait::async_trait;
use openbooks_core::{BookRecord, UNKNOWN_AUTHOR};
use serde_json::Value;
use tracing::debug;

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::http::{HttpClient, join_url};
use crate::sources::BookProvider;

pub const SOURCE_NAME: &str = "Open Library";

const COVERS_URL: &str = "https://covers.openlibrary.org/b/id";
const PUBLIC_URL: &str = "https://openlibrary.org";

/// One entry of `search.json`'s `docs`.
#[derive(Debug, Clone, Default)]
pub struct OpenLibraryDoc {
    pub key: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub cover_id: Option<i64>,
}

impl OpenLibraryDoc {
    pub fn from_json(v: &Value) -> Self {
        let key = v
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let title = v
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        let authors = v
            .get("author_name")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let publisher = v
            .get("publisher")
            .and_then(Value::as_array)
            .and_then(|arr| arr.first())
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        let cover_id = v.get("cover_i").and_then(Value::as_i64);

        Self {
            key,
            title,
            authors,
            publisher,
            cover_id,
        }
    }

    /// `None` for docs without a work key or a title.
    pub fn into_record(self) -> Option<BookRecord> {
        if self.key.is_empty() || self.title.is_empty() {
            return None;
        }

        let author = if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.join(", ")
        };
        let summary = match &self.publisher {
            Some(publisher) => format!("Disponível no Open Library. Editora: {publisher}"),
            None => "Disponível no Open Library.".to_string(),
        };
        let local_id = self.key.trim_start_matches("/works/");

        Some(
            BookRecord::new(format!("ol_{local_id}"), self.title.clone(), SOURCE_NAME)
                .with_author(author)
                .with_language("pt")
                .with_links(None, Some(format!("{PUBLIC_URL}{}", self.key)))
                .with_cover(self.cover_id.map(|id| format!("{COVERS_URL}/{id}-L.jpg")))
                .with_summary(Some(summary)),
        )
    }
}

pub struct OpenLibrarySource {
    client: HttpClient,
    base_url: String,
}

impl OpenLibrarySource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let endpoint = &config.openlibrary;
        Ok(Self {
            client: HttpClient::new(endpoint.timeout, &config.user_agent)?,
            base_url: endpoint.base_url.clone(),
        })
    }
}

#[async_trait]
impl BookProvider for OpenLibrarySource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<BookRecord>> {
        let url = join_url(&self.base_url, "search.json")?;
        let limit_param = limit.to_string();
        let json: Value = self
            .client
            .get_json(
                url.as_str(),
                &[
                    ("q", query),
                    ("language", "por"),
                    ("has_fulltext", "true"),
                    ("limit", limit_param.as_str()),
                ],
            )
            .await?;

        let records: Vec<BookRecord> = json
            .get("docs")
            .and_then(Value::as_array)
            .map(|docs| {
                docs.iter()
                    .map(OpenLibraryDoc::from_json)
                    .filter_map(OpenLibraryDoc::into_record)
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default();
        debug!(source = SOURCE_NAME, %query, count = records.len(), "search finished");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn parses_search_doc() {
        let doc = json!({
            "key": "/works/OL45804W",
            "title": "Memórias Póstumas de Brás Cubas",
            "author_name": ["Machado de Assis"],
            "publisher": ["Garnier", "Ática"],
            "cover_i": 12345
        });

        let record = OpenLibraryDoc::from_json(&doc).into_record().unwrap();
        assert_eq!(record.id, "ol_OL45804W");
        assert_eq!(record.author, "Machado de Assis");
        assert_eq!(
            record.cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/12345-L.jpg")
        );
        assert_eq!(
            record.preview_url.as_deref(),
            Some("https://openlibrary.org/works/OL45804W")
        );
        assert!(record.download_url.is_none());
        assert_eq!(
            record.summary.as_deref(),
            Some("Disponível no Open Library. Editora: Garnier")
        );
    }

    #[test]
    fn doc_without_key_or_title_is_skipped() {
        assert!(OpenLibraryDoc::from_json(&json!({"title": "No key"})).into_record().is_none());
        assert!(OpenLibraryDoc::from_json(&json!({"key": "/works/OL1W"})).into_record().is_none());
    }

    #[tokio::test]
    async fn test_search_sends_filters() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "iracema".into()),
                Matcher::UrlEncoded("language".into(), "por".into()),
                Matcher::UrlEncoded("has_fulltext".into(), "true".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"numFound": 2, "docs": [
                    {"key": "/works/OL1W", "title": "Iracema", "author_name": ["José de Alencar"]},
                    {"key": "/works/OL2W", "title": "Iracema: lenda do Ceará"}
                ]}"#,
            )
            .create_async()
            .await;

        let source = OpenLibrarySource::new(&SourcesConfig::with_base_url(&server.url())).unwrap();
        let records = source.search("iracema", 5).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].summary.as_deref(), Some("Disponível no Open Library."));
        assert_eq!(records[1].author, UNKNOWN_AUTHOR);
        assert!(records[1].cover_url.is_none());
    }
}
