use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::updater::UpdaterOptions;

/// Environment variable that overrides `github.token`
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Main configuration structure
///
/// Loaded from `<config dir>/toolcat/config.toml`; every field has a default,
/// so a missing file or a partial one is fine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub cache: CacheConfig,
    pub dataset: DatasetConfig,
    pub updater: UpdaterConfig,
}

impl Config {
    /// Load config from the default location, or defaults if there is none
    pub fn load() -> crate::Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// XDG on Linux, Application Support on macOS, AppData on Windows
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("toolcat").join("config.toml"))
    }

    /// `GITHUB_TOKEN` wins over the config file
    pub fn github_token(&self) -> Option<String> {
        resolve_token(std::env::var(GITHUB_TOKEN_ENV).ok(), self.github.token.clone())
    }
}

fn resolve_token(env: Option<String>, file: Option<String>) -> Option<String> {
    env.filter(|t| !t.trim().is_empty())
        .or(file.filter(|t| !t.trim().is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token; raises the API quota
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a fetched star count stays valid
    pub ttl_hours: u64,

    /// SQLite file for star counts; defaults under the user cache dir
    pub db_path: Option<PathBuf>,
}

impl CacheConfig {
    pub fn resolved_db_path(&self) -> Option<PathBuf> {
        self.db_path.clone().or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("toolcat").join("stars.db"))
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            db_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub tools_json: PathBuf,
    pub categories_json: PathBuf,
    /// Fetch the JSON files over HTTP instead of from disk
    pub base_url: Option<String>,
    /// YAML sources rewritten by the updater
    pub tools_dir: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            tools_json: PathBuf::from("src/assets/data/tools.json"),
            categories_json: PathBuf::from("src/assets/data/categories.json"),
            base_url: None,
            tools_dir: PathBuf::from("data/tools"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    pub delay_ms: u64,
    pub contributors_per_page: u32,
    pub top_contributors: usize,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            contributors_per_page: 5,
            top_contributors: 3,
        }
    }
}

impl From<&UpdaterConfig> for UpdaterOptions {
    fn from(config: &UpdaterConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.delay_ms),
            contributors_per_page: config.contributors_per_page,
            top_contributors: config.top_contributors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.updater.delay_ms, 1000);
        assert_eq!(config.updater.top_contributors, 3);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.dataset.tools_dir, PathBuf::from("data/tools"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nttl_hours = 6\n\n[dataset]\nbase_url = \"https://tools.example\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.cache.ttl_hours, 6);
        assert_eq!(config.dataset.base_url.as_deref(), Some("https://tools.example"));
        assert_eq!(config.updater.contributors_per_page, 5);
    }

    #[test]
    fn test_broken_file_is_a_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_token_takes_precedence() {
        assert_eq!(
            resolve_token(Some("env".into()), Some("file".into())).as_deref(),
            Some("env")
        );
        assert_eq!(
            resolve_token(Some(" ".into()), Some("file".into())).as_deref(),
            Some("file")
        );
        assert_eq!(resolve_token(None, None), None);
    }

    #[test]
    fn test_updater_options_from_config() {
        let options = UpdaterOptions::from(&UpdaterConfig::default());
        assert_eq!(options.delay, Duration::from_secs(1));
    }
}
