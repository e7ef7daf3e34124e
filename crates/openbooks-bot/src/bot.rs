use std::sync::Arc;
use std::time::Duration;

use openbooks_core::config::BotConfig;
use openbooks_core::BookRecord;
use openbooks_sources::{Aggregator, ProviderOutcome};
use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::reply::{self, Request};
use crate::telegram::{Message, SendMessage, TelegramClient, Update};

const RETRY_PAUSE: Duration = Duration::from_secs(3);

pub struct Bot {
    client: TelegramClient,
    aggregator: Arc<Aggregator>,
    poll_timeout: Duration,
    results_per_reply: usize,
}

impl Bot {
    pub fn new(client: TelegramClient, aggregator: Arc<Aggregator>, config: &BotConfig) -> Self {
        Self {
            client,
            aggregator,
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
            results_per_reply: config.results_per_reply,
        }
    }

    /// Build a bot whose token comes from the environment variable named in `config`.
    pub fn from_env(aggregator: Arc<Aggregator>, config: &BotConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BotError::MissingToken(config.token_env.clone()))?;
        let client = TelegramClient::new(token.trim(), Duration::from_secs(config.poll_timeout_secs))?;
        Ok(Self::new(client, aggregator, config))
    }

    /// Long-poll forever. Poll errors are logged and retried after a pause.
    pub async fn run(&self) {
        info!("telegram bot polling");
        let mut offset = 0;
        loop {
            match self.poll_once(offset).await {
                Ok(next) => offset = next,
                Err(err) => {
                    warn!(error = %err, "polling failed");
                    tokio::time::sleep(RETRY_PAUSE).await;
                }
            }
        }
    }

    /// Fetch and handle one batch of updates; returns the next offset.
    pub async fn poll_once(&self, offset: i64) -> Result<i64> {
        let updates = self.client.get_updates(offset, self.poll_timeout).await?;
        let mut next = offset;
        for update in updates {
            next = next.max(update.update_id + 1);
            self.handle_update(update).await;
        }
        Ok(next)
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };

        let sent = match Request::parse(text) {
            Request::Help => {
                self.client
                    .send_message(&SendMessage::plain(message.chat.id, reply::WELCOME).replying_to(message.message_id))
                    .await
            }
            Request::Search(query) => self.answer_search(&message, query).await,
            Request::Ignore => Ok(()),
        };
        if let Err(err) = sent {
            warn!(chat = message.chat.id, error = %err, "failed to reply");
        }
    }

    async fn answer_search(&self, message: &Message, query: &str) -> Result<()> {
        let chat = message.chat.id;
        let searching = reply::searching(query);
        self.client
            .send_message(&SendMessage::plain(chat, &searching).replying_to(message.message_id))
            .await?;

        let text = match self.collect_results(query).await {
            Some(books) if books.is_empty() => {
                return self
                    .client
                    .send_message(&SendMessage::plain(chat, reply::NO_RESULTS))
                    .await;
            }
            Some(books) => reply::results(query, &books, self.results_per_reply),
            None => {
                return self
                    .client
                    .send_message(&SendMessage::plain(chat, reply::SEARCH_FAILED))
                    .await;
            }
        };
        self.client.send_message(&SendMessage::markdown(chat, &text)).await
    }

    /// Successful results across providers, or `None` when every provider failed.
    async fn collect_results(&self, query: &str) -> Option<Vec<BookRecord>> {
        let outcomes = self.aggregator.fan_out(query, self.results_per_reply).await;
        let any_success = outcomes.is_empty() || outcomes.iter().any(ProviderOutcome::is_success);

        let mut books = Vec::new();
        for outcome in outcomes {
            match outcome {
                ProviderOutcome::Success { records, .. } => books.extend(records),
                ProviderOutcome::Failure { provider, error } => {
                    warn!(provider, %error, "provider failed for bot search");
                }
            }
        }
        debug!(%query, count = books.len(), "bot search finished");

        if any_success { Some(books) } else { None }
    }
}
