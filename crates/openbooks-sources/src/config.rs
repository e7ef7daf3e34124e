use std::time::Duration;

use openbooks_core::AppConfig;
use openbooks_core::config::ProvidersConfig;

/// Browser-like user agent; Anna's Archive rejects obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct SourceEndpoint {
    pub base_url: String,
    pub timeout: Duration,
}

impl SourceEndpoint {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Endpoints and switches for every provider.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub user_agent: String,
    pub annas_archive: SourceEndpoint,
    pub gutenberg: SourceEndpoint,
    pub openlibrary: SourceEndpoint,
    pub internet_archive: SourceEndpoint,
    pub enabled: ProvidersConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            annas_archive: SourceEndpoint::new("https://annas-archive.li", 15),
            gutenberg: SourceEndpoint::new("https://gutendex.com", 10),
            openlibrary: SourceEndpoint::new("https://openlibrary.org", 10),
            internet_archive: SourceEndpoint::new("https://archive.org", 15),
            enabled: ProvidersConfig::default(),
        }
    }
}

impl SourcesConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            enabled: config.providers.clone(),
            ..Self::default()
        }
    }

    /// Point every provider at one base URL. Used by tests against a mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        let timeout = 5;
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            annas_archive: SourceEndpoint::new(base_url, timeout),
            gutenberg: SourceEndpoint::new(base_url, timeout),
            openlibrary: SourceEndpoint::new(base_url, timeout),
            internet_archive: SourceEndpoint::new(base_url, timeout),
            enabled: ProvidersConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_public_endpoints() {
        let config = SourcesConfig::default();
        assert_eq!(config.annas_archive.timeout, Duration::from_secs(15));
        assert_eq!(config.gutenberg.timeout, Duration::from_secs(10));
        assert_eq!(config.openlibrary.base_url, "https://openlibrary.org");
        assert!(config.user_agent.contains("Chrome/"));
    }

    #[test]
    fn test_from_app_config_copies_switches() {
        let mut app = AppConfig::default();
        app.providers.internet_archive = false;
        let config = SourcesConfig::from_app_config(&app);
        assert!(!config.enabled.internet_archive);
        assert!(config.enabled.gutenberg);
    }
}
