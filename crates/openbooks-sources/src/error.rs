use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider task {provider} failed: {reason}")]
    TaskFailed { provider: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SourceError>;
