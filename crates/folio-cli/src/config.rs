//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/qanything";
pub const DEFAULT_PORTFOLIO_DIR: &str = "zuopinji";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "FOLIO_QA_API_KEY";

/// Configuration for folio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// QA endpoint URL
    pub endpoint: Option<String>,
    /// Bearer token for the QA endpoint
    pub api_key: Option<String>,
    /// Directory holding the portfolio's `.html` files
    pub portfolio_dir: Option<PathBuf>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// Port for `--serve`
    pub port: Option<u16>,
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
    }

    /// Config file path, `FOLIO_CONFIG_PATH` first
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FOLIO_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`; a missing or broken file yields the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Write a default config at `path` unless one already exists
    pub fn init_at(path: &Path) -> std::io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        let default_config = Config {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            api_key: None,
            portfolio_dir: Some(PathBuf::from(DEFAULT_PORTFOLIO_DIR)),
            tui: Some(true),
            port: Some(DEFAULT_PORT),
        };
        default_config.save_to(path)
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn portfolio_dir(&self) -> PathBuf {
        self.portfolio_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PORTFOLIO_DIR))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// API key from the config file, then the environment
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# folio configuration file
# Place at ~/.config/folio/config.toml (Linux/Mac) or %APPDATA%\folio\config.toml (Windows)

# QA endpoint that streams answers
endpoint = "http://localhost:3000/api/qanything"

# Bearer token for the endpoint (optional; FOLIO_QA_API_KEY also works)
# api_key = "..."

# Directory with the portfolio's .html files
portfolio_dir = "zuopinji"

# Whether to use TUI mode by default (true by default)
# Set to false for simple stdin/stdout mode
tui = true

# Port for `folio --serve`
port = 8080
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.portfolio_dir(), PathBuf::from(DEFAULT_PORTFOLIO_DIR));
    }

    #[test]
    fn test_parse_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "endpoint = \"https://qa.example.com/stream\"\napi_key = \"k\"\nportfolio_dir = \"/srv/site\"\ntui = false\nport = 9000\n",
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.endpoint(), "https://qa.example.com/stream");
        assert_eq!(config.api_key().as_deref(), Some("k"));
        assert_eq!(config.portfolio_dir(), PathBuf::from("/srv/site"));
        assert_eq!(config.tui, Some(false));
        assert_eq!(config.port(), 9000);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = \"not a number\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init_at(&path).unwrap();
        let written = Config::load_from(&path);
        assert_eq!(written.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(written.tui, Some(true));

        fs::write(&path, "port = 1234\n").unwrap();
        Config::init_at(&path).unwrap();
        assert_eq!(Config::load_from(&path).port(), 1234);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.api_key, None);
    }
}
