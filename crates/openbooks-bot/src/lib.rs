//! Telegram front end: long-polls for messages and answers with search results.

pub mod bot;
pub mod error;
pub mod reply;
pub mod telegram;

pub use bot::Bot;
pub use error::{BotError, Result};
pub use telegram::TelegramClient;
