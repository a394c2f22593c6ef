use thiserror::Error;

/// All the ways things can go wrong in the catalogue
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    GitHub(#[from] toolcat_api::GitHubError),

    #[error("Cache operation failed: {0}")]
    Cache(#[from] toolcat_cache::CacheError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid tool record: {0}")]
    InvalidRecord(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
