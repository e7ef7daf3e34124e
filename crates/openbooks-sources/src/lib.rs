//! Book metadata providers and the aggregate search over them.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod http;
pub mod sources;

pub use aggregate::{Aggregator, ProviderOutcome};
pub use config::{SourceEndpoint, SourcesConfig};
pub use error::{Result, SourceError};
pub use sources::BookProvider;
