use async_trait::async_trait;
use openbooks_core::{BookRecord, UNKNOWN_AUTHOR, truncate_with_ellipsis};
use serde_json::Value;
use tracing::debug;

use crate::config::SourcesConfig;
use crate::error::Result;
use crate::http::{HttpClient, join_url};
use crate::sources::BookProvider;

pub const SOURCE_NAME: &str = "Internet Archive";

const PUBLIC_URL: &str = "https://archive.org";
const DEFAULT_SUMMARY: &str = "Disponível no Internet Archive.";
const SUMMARY_MAX_CHARS: usize = 500;
const FIELDS: &[&str] = &[
    "identifier",
    "title",
    "creator",
    "description",
    "downloads",
    "language",
];

/// `creator` and `description` come back either as a string or as a list.
fn string_or_list(v: Option<&Value>) -> Vec<String> {
    match v {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn doc_to_record(doc: &Value) -> Option<BookRecord> {
    let identifier = doc
        .get("identifier")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let title = doc
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let creators = string_or_list(doc.get("creator"));
    let author = if creators.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        creators.join(", ")
    };

    let description = string_or_list(doc.get("description"))
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    Some(
        BookRecord::new(format!("ia_{identifier}"), title, SOURCE_NAME)
            .with_author(author)
            .with_language("pt")
            .with_links(
                Some(format!("{PUBLIC_URL}/download/{identifier}/{identifier}.pdf")),
                Some(format!("{PUBLIC_URL}/details/{identifier}?view=theater")),
            )
            .with_cover(Some(format!("{PUBLIC_URL}/services/img/{identifier}")))
            .with_summary(Some(truncate_with_ellipsis(&description, SUMMARY_MAX_CHARS))),
    )
}

/// Internet Archive advanced search, restricted to Portuguese texts.
pub struct InternetArchiveSource {
    client: HttpClient,
    base_url: String,
}

impl InternetArchiveSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let endpoint = &config.internet_archive;
        Ok(Self {
            client: HttpClient::new(endpoint.timeout, &config.user_agent)?,
            base_url: endpoint.base_url.clone(),
        })
    }

    fn search_params(query: &str, limit: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![(
            "q",
            format!("{query} AND mediatype:(texts) AND language:(por)"),
        )];
        params.extend(FIELDS.iter().map(|f| ("fl[]", (*f).to_string())));
        params.push(("sort[]", "downloads desc".to_string()));
        params.push(("rows", limit.to_string()));
        params.push(("output", "json".to_string()));
        params
    }
}

#[async_trait]
impl BookProvider for InternetArchiveSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<BookRecord>> {
        let url = join_url(&self.base_url, "advancedsearch.php")?;
        let json: Value = self
            .client
            .get_json(url.as_str(), &Self::search_params(query, limit))
            .await?;

        let records: Vec<BookRecord> = json
            .get("response")
            .and_then(|r| r.get("docs"))
            .and_then(Value::as_array)
            .map(|docs| docs.iter().filter_map(doc_to_record).take(limit).collect())
            .unwrap_or_default();
        debug!(source = SOURCE_NAME, %query, count = records.len(), "search finished");
        Ok(records)
    }
}
