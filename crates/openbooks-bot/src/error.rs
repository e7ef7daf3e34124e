use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("bot token not set: environment variable {0} is empty")]
    MissingToken(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
