// Wiring shared by the toolcat binaries
use std::sync::Arc;
use toolcat_api::{GitHubClient, RetryConfig};
use toolcat_cache::{KeyValueStore, MemoryStore, SqliteStore, StarCache};
use toolcat_core::{Config, DatasetSource, FileSource, HttpSource};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toolcat=info,update_tools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub fn github_client(config: &Config, retry: RetryConfig) -> anyhow::Result<GitHubClient> {
    let client = GitHubClient::with_base_url(config.github_token(), config.github.api_url.clone())?
        .with_retry_config(retry);
    Ok(client)
}

/// Persistent star cache, or an in-memory one if the database cannot be opened
pub fn star_cache(config: &Config) -> StarCache {
    let store: Arc<dyn KeyValueStore> = match config.cache.resolved_db_path() {
        Some(path) => match SqliteStore::open(&path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!("Star cache unavailable at {}: {}", path.display(), e);
                Arc::new(MemoryStore::new())
            }
        },
        None => Arc::new(MemoryStore::new()),
    };
    StarCache::new(store)
}

pub fn dataset_source(config: &Config) -> Arc<dyn DatasetSource> {
    match &config.dataset.base_url {
        Some(base_url) => Arc::new(HttpSource::new(base_url.clone())),
        None => Arc::new(FileSource::new(
            config.dataset.tools_json.clone(),
            config.dataset.categories_json.clone(),
        )),
    }
}
