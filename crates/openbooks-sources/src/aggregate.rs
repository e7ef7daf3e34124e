//! Fan-out search across every enabled provider.
//!
//! Each provider runs in its own task with the same query and limit. A
//! provider that errors or panics is logged and contributes nothing; the
//! others are unaffected.

use std::sync::Arc;

use futures::future::join_all;
use openbooks_core::BookRecord;
use tracing::{debug, warn};

use crate::config::SourcesConfig;
use crate::error::{Result, SourceError};
use crate::sources::{
    AnnasArchiveSource, BookProvider, GutenbergSource, InternetArchiveSource, OpenLibrarySource,
};

/// Result of one provider's task.
#[derive(Debug)]
pub enum ProviderOutcome {
    Success {
        provider: &'static str,
        records: Vec<BookRecord>,
    },
    Failure {
        provider: &'static str,
        error: SourceError,
    },
}

impl ProviderOutcome {
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Success { provider, .. } | Self::Failure { provider, .. } => provider,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Clone)]
pub struct Aggregator {
    providers: Vec<Arc<dyn BookProvider>>,
}

impl Aggregator {
    /// Providers are queried concurrently but results keep this order.
    pub fn new(providers: Vec<Arc<dyn BookProvider>>) -> Self {
        Self { providers }
    }

    /// Build the enabled providers in their fixed order.
    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        let mut providers: Vec<Arc<dyn BookProvider>> = Vec::new();
        if config.enabled.annas_archive {
            providers.push(Arc::new(AnnasArchiveSource::new(config)?));
        }
        if config.enabled.gutenberg {
            providers.push(Arc::new(GutenbergSource::new(config)?));
        }
        if config.enabled.openlibrary {
            providers.push(Arc::new(OpenLibrarySource::new(config)?));
        }
        if config.enabled.internet_archive {
            providers.push(Arc::new(InternetArchiveSource::new(config)?));
        }
        Ok(Self::new(providers))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Run every provider with `limit` and return one tagged outcome per provider.
    pub async fn fan_out(&self, query: &str, limit: usize) -> Vec<ProviderOutcome> {
        let tasks = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let query = query.to_string();
            let name = provider.name();
            let handle = tokio::spawn(async move { provider.search(&query, limit).await });
            async move {
                match handle.await {
                    Ok(Ok(records)) => ProviderOutcome::Success {
                        provider: name,
                        records,
                    },
                    Ok(Err(error)) => ProviderOutcome::Failure {
                        provider: name,
                        error,
                    },
                    Err(join_error) => ProviderOutcome::Failure {
                        provider: name,
                        error: SourceError::TaskFailed {
                            provider: name.to_string(),
                            reason: join_error.to_string(),
                        },
                    },
                }
            }
        });
        join_all(tasks).await
    }

    /// Concatenate successful results in provider order, truncated to `limit`.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<BookRecord> {
        let mut results = self.search_all(query, limit).await;
        results.truncate(limit);
        results
    }

    /// Like [`Aggregator::search`] but keeps every record, up to `limit` per provider.
    pub async fn search_all(&self, query: &str, limit: usize) -> Vec<BookRecord> {
        if limit == 0 {
            return Vec::new();
        }

        let mut results = Vec::new();
        for outcome in self.fan_out(query, limit).await {
            match outcome {
                ProviderOutcome::Success { provider, records } => {
                    debug!(provider, count = records.len(), "provider finished");
                    results.extend(records);
                }
                ProviderOutcome::Failure { provider, error } => {
                    warn!(provider, %error, "provider failed");
                }
            }
        }
        results
    }
}
