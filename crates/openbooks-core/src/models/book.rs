use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title meaning extraction failed. Never surfaced by a provider.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Placeholder author used when no author could be recovered.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Marker appended to text cut by [`truncate_with_ellipsis`].
pub const ELLIPSIS: &str = "...";

// ─── BookRecord ─────────────────────────────────────────────

/// The unified book entity returned by every source.
///
/// `id` is the source-local identifier prefixed with the source's namespace
/// tag (`gutenberg_`, `ol_`, `ia_`, `aa_`), so ids from different sources
/// never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default)]
    pub language: String,

    pub source: String,

    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub preview_url: Option<String>,

    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,
}

fn default_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

impl BookRecord {
    /// Build a record with the required fields; optional links start empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: default_author(),
            language: String::new(),
            source: source.into(),
            download_url: None,
            preview_url: None,
            cover_url: None,
            summary: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_links(mut self, download_url: Option<String>, preview_url: Option<String>) -> Self {
        self.download_url = download_url;
        self.preview_url = preview_url;
        self
    }

    pub fn with_cover(mut self, cover_url: Option<String>) -> Self {
        self.cover_url = cover_url;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }

    /// Download link when available, else the preview link.
    pub fn best_link(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .or(self.preview_url.as_deref())
    }
}

// ─── CachedBook ─────────────────────────────────────────────

/// A row of the local cache: the record plus the time it was first stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedBook {
    #[serde(flatten)]
    pub book: BookRecord,
    pub created_at: DateTime<Utc>,
}

/// Cut `text` to at most `max_chars` characters, ending with `...` when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults_to_unknown_author() {
        let book = BookRecord::new("aa_abc", "Dom Casmurro", "Anna's Archive");
        assert_eq!(book.author, UNKNOWN_AUTHOR);
        assert!(book.cover_url.is_none());
    }

    #[test]
    fn test_best_link_prefers_download() {
        let book = BookRecord::new("x", "t", "s")
            .with_links(Some("d".into()), Some("p".into()));
        assert_eq!(book.best_link(), Some("d"));

        let book = BookRecord::new("x", "t", "s").with_links(None, Some("p".into()));
        assert_eq!(book.best_link(), Some("p"));
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_with_ellipsis("short", 200), "short");
    }

    #[test]
    fn test_truncate_cuts_on_char_boundary() {
        let text = "ção".repeat(100);
        let out = truncate_with_ellipsis(&text, 200);
        assert_eq!(out.chars().count(), 200);
        assert!(out.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_missing_author_deserializes_to_sentinel() {
        let book: BookRecord = serde_json::from_str(
            r#"{"id":"ol_1","title":"Iracema","source":"Open Library"}"#,
        )
        .unwrap();
        assert_eq!(book.author, UNKNOWN_AUTHOR);
        assert!(book.summary.is_none());
    }
}
