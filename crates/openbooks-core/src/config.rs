use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root application configuration, loaded from `~/.config/openbooks/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub providers: ProvidersConfig,
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub data_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub category_limit: usize,
    pub featured_limit: usize,
    pub fantasy_featured_limit: usize,
}

/// Which providers take part in the aggregate search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub annas_archive: bool,
    pub gutenberg: bool,
    pub openlibrary: bool,
    pub internet_archive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Name of the environment variable holding the Telegram bot token.
    pub token_env: String,
    pub results_per_reply: usize,
    pub poll_timeout_secs: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("openbooks");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
            featured_file: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 60,
            category_limit: 100,
            featured_limit: 12,
            fantasy_featured_limit: 30,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            annas_archive: true,
            gutenberg: true,
            openlibrary: true,
            internet_archive: true,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            results_per_reply: 5,
            poll_timeout_secs: 30,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/openbooks/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("OPENBOOKS_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("openbooks")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn set_data_dir(&mut self, path: PathBuf) {
        self.core.data_dir = path.to_string_lossy().to_string();
    }

    /// Path to the SQLite cache database.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.core.data_dir).join("books.db")
    }

    /// Path to the featured collections JSON file.
    pub fn featured_path(&self) -> PathBuf {
        match &self.core.featured_file {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.core.data_dir).join("preloaded_books.json"),
        }
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.search.default_limit, 60);
        assert_eq!(cfg.bot.token_env, "TELEGRAM_BOT_TOKEN");
        assert!(cfg.providers.annas_archive);
        assert!(!cfg.core.data_dir.is_empty());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.server.port = 9100;
        cfg.providers.internet_archive = false;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert!(!loaded.providers.internet_archive);
        assert_eq!(loaded.search.category_limit, cfg.search.category_limit);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8181\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.server.port, 8181);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.bot.results_per_reply, 5);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = AppConfig::load_from(Path::new("/tmp/nonexistent_openbooks_config.toml")).unwrap();
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn test_derived_paths() {
        let mut cfg = AppConfig::default();
        cfg.set_data_dir(PathBuf::from("/srv/openbooks"));
        assert_eq!(cfg.database_path(), PathBuf::from("/srv/openbooks/books.db"));
        assert_eq!(
            cfg.featured_path(),
            PathBuf::from("/srv/openbooks/preloaded_books.json")
        );

        cfg.core.featured_file = Some("/etc/openbooks/featured.json".to_string());
        assert_eq!(cfg.featured_path(), PathBuf::from("/etc/openbooks/featured.json"));
    }
}
