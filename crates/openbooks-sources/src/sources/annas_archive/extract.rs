//! Field extraction for one result block.
//!
//! Every field is recovered through an ordered list of fallbacks. Each step is a
//! small function returning `Option`, chained with `or_else`.

use once_cell::sync::Lazy;
use openbooks_core::{BookRecord, UNKNOWN_AUTHOR, UNKNOWN_TITLE, truncate_with_ellipsis};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::SOURCE_NAME;
use super::segment::block_body;

const SUMMARY_MAX_CHARS: usize = 200;
const AUTHOR_MAX_CHARS: usize = 100;
const SUMMARY_FALLBACK_TEXTS: usize = 5;
const MIN_TEXT_CHARS: usize = 2;

static MD5_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"/md5/([^/?#"\s]+)"#).expect("valid regex"));
static PORTUGUESE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:portuguese|pt)\b").expect("valid regex"));

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img[src]"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));
static DATA_CONTENT: Lazy<Selector> = Lazy::new(|| selector("[data-content]"));
static AUTHOR_STYLED: Lazy<Selector> =
    Lazy::new(|| selector(r#"div[class^="font-bold"][data-content]"#));
static ITALIC: Lazy<Selector> = Lazy::new(|| selector("div.italic"));
static SUMMARY_LINE: Lazy<Selector> = Lazy::new(|| selector("div.truncate.text-xs.text-gray-500"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Which heuristic produced the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleOrigin {
    Heading,
    DataContent,
    VisibleText,
}

/// Fields recovered from one block, before mapping into a [`BookRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub md5: String,
    pub title: String,
    pub title_origin: TitleOrigin,
    pub author: String,
    pub cover_url: Option<String>,
    pub summary: Option<String>,
    pub language: &'static str,
}

impl Candidate {
    pub fn into_record(self, base_url: &str) -> BookRecord {
        let link = format!("{}/md5/{}", base_url.trim_end_matches('/'), self.md5);
        BookRecord::new(format!("aa_{}", self.md5), self.title, SOURCE_NAME)
            .with_author(self.author)
            .with_language(self.language)
            .with_links(Some(link.clone()), Some(link))
            .with_cover(self.cover_url)
            .with_summary(self.summary)
    }
}

/// Extract a candidate from a block, or `None` when it has no identifier or title.
pub fn extract_candidate(block: &str, base_url: &str) -> Option<Candidate> {
    let fragment = Html::parse_fragment(block_body(block));

    let md5 = extract_md5(&fragment)?;
    let texts = visible_texts(&fragment);
    let (title, title_origin) = extract_title(&fragment, &texts)?;
    let author = extract_author(&fragment, &texts, title_origin)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let summary = extract_summary(&fragment, &texts);
    let language = detect_language(summary.as_deref());
    let cover_url = extract_cover(&fragment, base_url);

    Some(Candidate {
        md5,
        title,
        title_origin,
        author,
        cover_url,
        summary,
        language,
    })
}

fn extract_md5(fragment: &Html) -> Option<String> {
    fragment
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| MD5_HREF_RE.captures(href))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A sentinel title at one step falls through to the next.
fn extract_title(fragment: &Html, texts: &[String]) -> Option<(String, TitleOrigin)> {
    let real = |title: &String| title != UNKNOWN_TITLE;
    title_from_heading(fragment)
        .filter(real)
        .map(|t| (t, TitleOrigin::Heading))
        .or_else(|| {
            title_from_data_content(fragment)
                .filter(real)
                .map(|t| (t, TitleOrigin::DataContent))
        })
        .or_else(|| {
            first_long_text(texts, 0)
                .filter(real)
                .map(|t| (t, TitleOrigin::VisibleText))
        })
}

fn title_from_heading(fragment: &Html) -> Option<String> {
    fragment
        .select(&HEADING)
        .map(|h| element_text(&h))
        .find(|text| !text.is_empty())
}

fn title_from_data_content(fragment: &Html) -> Option<String> {
    fragment
        .select(&DATA_CONTENT)
        .filter_map(|el| el.value().attr("data-content"))
        .map(normalize_whitespace)
        .find(|text| !text.is_empty())
}

fn extract_author(fragment: &Html, texts: &[String], origin: TitleOrigin) -> Option<String> {
    author_from_styled(fragment)
        .or_else(|| author_from_italic(fragment))
        .or_else(|| {
            if origin == TitleOrigin::VisibleText {
                first_long_text(texts, 1).map(|t| t.chars().take(AUTHOR_MAX_CHARS).collect())
            } else {
                None
            }
        })
}

/// The first author-styled element is the title; the second one is the author.
fn author_from_styled(fragment: &Html) -> Option<String> {
    fragment
        .select(&AUTHOR_STYLED)
        .nth(1)
        .and_then(|el| el.value().attr("data-content"))
        .map(normalize_whitespace)
        .filter(|text| !text.is_empty())
}

fn author_from_italic(fragment: &Html) -> Option<String> {
    fragment
        .select(&ITALIC)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
}

fn extract_summary(fragment: &Html, texts: &[String]) -> Option<String> {
    let raw = fragment
        .select(&SUMMARY_LINE)
        .map(|el| element_text(&el))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| {
            texts
                .iter()
                .take(SUMMARY_FALLBACK_TEXTS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" | ")
        });

    if raw.is_empty() {
        None
    } else {
        Some(truncate_with_ellipsis(&raw, SUMMARY_MAX_CHARS))
    }
}

pub fn detect_language(summary: Option<&str>) -> &'static str {
    match summary {
        Some(text) if PORTUGUESE_RE.is_match(text) => "pt",
        _ => "en",
    }
}

fn extract_cover(fragment: &Html, base_url: &str) -> Option<String> {
    fragment
        .select(&IMAGE)
        .filter_map(|img| img.value().attr("src"))
        .next()
        .and_then(|src| absolutize(src, base_url))
}

/// Make an image source absolute against `base_url`.
pub fn absolutize(raw: &str, base_url: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("//") {
        return Some(format!("https:{raw}"));
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if raw.starts_with('/') {
        return Some(format!("{}{}", base_url.trim_end_matches('/'), raw));
    }
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok()?;
    base.join(raw).ok().map(String::from)
}

/// Distinct, trimmed, non-empty text nodes in document order, skipping scripts and styles.
fn visible_texts(fragment: &Html) -> Vec<String> {
    let mut texts: Vec<String> = Vec::new();
    for node in fragment.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| name == "script" || name == "style");
        if hidden {
            continue;
        }
        let text = normalize_whitespace(text);
        if !text.is_empty() && !texts.contains(&text) {
            texts.push(text);
        }
    }
    texts
}

/// The `nth` entry (zero-based) among texts longer than two characters.
fn first_long_text(texts: &[String], nth: usize) -> Option<String> {
    texts
        .iter()
        .filter(|t| t.chars().count() > MIN_TEXT_CHARS)
        .nth(nth)
        .cloned()
}

fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
