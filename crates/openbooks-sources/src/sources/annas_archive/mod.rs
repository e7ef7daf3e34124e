//! Anna's Archive search-page scraper.
//!
//! Fetch one search page, split it into result blocks, extract fields from
//! each block and assemble at most `limit` unique records in page order.
//! Failures never escape: a page that cannot be fetched yields no results.

pub mod dedup;
pub mod extract;
pub mod segment;

use async_trait::async_trait;
use openbooks_core::BookRecord;
use tracing::{debug, warn};

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::http::{HttpClient, join_url};
use crate::sources::BookProvider;

use dedup::SeenIds;
use extract::extract_candidate;
use segment::split_blocks;

pub const SOURCE_NAME: &str = "Anna's Archive";

pub struct AnnasArchiveSource {
    client: HttpClient,
    base_url: String,
}

impl AnnasArchiveSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let endpoint = &config.annas_archive;
        Ok(Self {
            client: HttpClient::new(endpoint.timeout, &config.user_agent)?,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_search_page(&self, query: &str) -> Result<String> {
        let url = join_url(&self.base_url, "search")?;
        self.client
            .get_with_query(url.as_str(), &[("q", query)])
            .await
    }

    /// Turn a search page into at most `limit` records, in document order.
    pub fn parse_search_html(&self, html: &str, limit: usize) -> Vec<BookRecord> {
        assemble(html, &self.base_url, limit)
    }
}

pub fn assemble(html: &str, base_url: &str, limit: usize) -> Vec<BookRecord> {
    let mut seen = SeenIds::new();
    let mut records = Vec::new();

    for block in split_blocks(html) {
        if records.len() >= limit {
            break;
        }
        let Some(candidate) = extract_candidate(block, base_url) else {
            continue;
        };
        if !seen.insert(&candidate.md5) {
            continue;
        }
        records.push(candidate.into_record(base_url));
    }

    records
}

#[async_trait]
impl BookProvider for AnnasArchiveSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<BookRecord>> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let html = match self.fetch_search_page(query).await {
            Ok(html) => html,
            Err(err) => {
                warn!(source = SOURCE_NAME, %query, error = %err, "search page fetch failed");
                return Ok(Vec::new());
            }
        };

        let records = self.parse_search_html(&html, limit);
        debug!(source = SOURCE_NAME, %query, count = records.len(), "parsed search page");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use openbooks_core::{UNKNOWN_AUTHOR, UNKNOWN_TITLE};
    use segment::BLOCK_MARKER;

    const FIXTURE: &str = include_str!("fixtures/search_page.html");

    fn source_for(base_url: &str) -> AnnasArchiveSource {
        AnnasArchiveSource::new(&SourcesConfig::with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_parses_saved_search_fixture() {
        let records = assemble(FIXTURE, "https://annas-archive.li", 10);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "aa_0123456789abcdef0123456789abcdef",
                "aa_fedcba9876543210fedcba9876543210",
                "aa_11112222333344445555666677778888",
            ]
        );

        let first = &records[0];
        assert_eq!(first.title, "Dom Casmurro");
        assert_eq!(first.author, "Machado de Assis");
        assert_eq!(first.language, "pt");
        assert_eq!(
            first.cover_url.as_deref(),
            Some("https://annas-archive.li/covers/dom-casmurro.jpg")
        );

        let second = &records[1];
        assert_eq!(second.title, "The Count of Monte Cristo");
        assert_eq!(second.author, "Alexandre Dumas");
        assert_eq!(second.language, "en");
        assert_eq!(second.cover_url.as_deref(), Some("https://covers.example.org/monte.jpg"));

        let third = &records[2];
        assert_eq!(third.author, UNKNOWN_AUTHOR);
        assert_eq!(third.cover_url.as_deref(), Some("https://img.example.net/iracema.jpg"));

        assert!(records.iter().all(|r| r.title != UNKNOWN_TITLE));
        assert!(
            records
                .iter()
                .filter_map(|r| r.summary.as_deref())
                .all(|s| s.chars().count() <= 200)
        );
    }

    #[test]
    fn test_limit_keeps_document_order() {
        let html = format!(
            "<body>{m}\"><a href=\"/md5/a1\"></a><h3>One</h3></div>\
             {m}\"><a href=\"/md5/b2\"></a><h3>Two</h3></div>\
             {m}\"><a href=\"/md5/c3\"></a><h3>Three</h3></div></body>",
            m = BLOCK_MARKER
        );
        let titles: Vec<String> = assemble(&html, "https://annas-archive.li", 2)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }

    #[test]
    fn test_duplicates_do_not_count_toward_limit() {
        let html = format!(
            "{m}\"><a href=\"/md5/same\"></a><h3>First</h3>\
             {m}\"><a href=\"/md5/same\"></a><h3>Again</h3>\
             {m}\"><a href=\"/md5/other\"></a><h3>Second</h3>",
            m = BLOCK_MARKER
        );
        let records = assemble(&html, "https://annas-archive.li", 2);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["aa_same", "aa_other"]);
    }

    #[test]
    fn test_page_without_marker_is_empty() {
        assert!(assemble("<html><p>No results</p></html>", "https://annas-archive.li", 5).is_empty());
    }

    #[tokio::test]
    async fn test_search_fetches_page_with_query() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("q".into(), "machado de assis".into()))
            .match_header("user-agent", Matcher::Regex("Chrome/".into()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(FIXTURE)
            .create_async()
            .await;

        let source = source_for(&server.url());
        let records = source.search("machado de assis", 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].download_url.as_deref(),
            Some(format!("{}/md5/0123456789abcdef0123456789abcdef", server.url()).as_str())
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty_results() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let source = source_for(&server.url());
        assert!(source.search("iracema", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_or_zero_limit_skips_request() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let source = source_for(&server.url());
        assert!(source.search("   ", 5).await.unwrap().is_empty());
        assert!(source.search("iracema", 0).await.unwrap().is_empty());
        m.assert_async().await;
    }
}
