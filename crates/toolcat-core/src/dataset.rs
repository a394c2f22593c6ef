// Dataset loading: fetch tools and categories once, share the result with everyone
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{watch, OnceCell};
use tracing::{error, info, warn};

use crate::models::{CategoriesFile, Category, Tool};
use crate::Result;

/// Where the precomputed dataset comes from
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch_tools(&self) -> Result<Vec<Tool>>;
    async fn fetch_categories(&self) -> Result<Vec<Category>>;
}

/// `tools.json` and `categories.json` on the local disk
pub struct FileSource {
    tools_path: PathBuf,
    categories_path: PathBuf,
}

impl FileSource {
    pub fn new(tools_path: impl Into<PathBuf>, categories_path: impl Into<PathBuf>) -> Self {
        Self {
            tools_path: tools_path.into(),
            categories_path: categories_path.into(),
        }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch_tools(&self) -> Result<Vec<Tool>> {
        let contents = tokio::fs::read_to_string(&self.tools_path).await?;
        Ok(parse_tool_records(serde_json::from_str(&contents)?))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let contents = tokio::fs::read_to_string(&self.categories_path).await?;
        let file: CategoriesFile = serde_json::from_str(&contents)?;
        Ok(file.categories)
    }
}

/// The same two files served over HTTP, e.g. from a static site's assets
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch_tools(&self) -> Result<Vec<Tool>> {
        let url = format!("{}/tools.json", self.base_url);
        let tools = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<serde_json::Value>>()
            .await?;
        Ok(parse_tool_records(tools))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let url = format!("{}/categories.json", self.base_url);
        let file = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<CategoriesFile>()
            .await?;
        Ok(file.categories)
    }
}

/// Decode each record on its own; a malformed one is logged and dropped
pub fn parse_tool_records(records: Vec<serde_json::Value>) -> Vec<Tool> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Tool>(record) {
            Ok(tool) => Some(tool),
            Err(e) => {
                warn!("Skipping malformed tool record #{}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Loads the dataset at most once per instance
///
/// Concurrent callers share the first fetch. A failed fetch is logged and
/// replaced by an empty collection; `loaded` still flips to true so nobody
/// waits forever.
pub struct DatasetLoader {
    source: Arc<dyn DatasetSource>,
    tools: OnceCell<Arc<Vec<Tool>>>,
    categories: OnceCell<Arc<Vec<Category>>>,
    loaded: watch::Sender<bool>,
}

impl DatasetLoader {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        let (loaded, _) = watch::channel(false);
        Self {
            source,
            tools: OnceCell::new(),
            categories: OnceCell::new(),
            loaded,
        }
    }

    pub async fn load(&self) -> Arc<Vec<Tool>> {
        self.tools
            .get_or_init(|| async {
                let tools = match self.source.fetch_tools().await {
                    Ok(tools) => {
                        info!("Loaded {} tools", tools.len());
                        tools
                    }
                    Err(e) => {
                        error!("Error loading tools data: {}", e);
                        Vec::new()
                    }
                };
                self.loaded.send_replace(true);
                Arc::new(tools)
            })
            .await
            .clone()
    }

    /// Categories in display order
    pub async fn load_categories(&self) -> Arc<Vec<Category>> {
        self.categories
            .get_or_init(|| async {
                let mut categories = match self.source.fetch_categories().await {
                    Ok(categories) => categories,
                    Err(e) => {
                        error!("Error loading categories data: {}", e);
                        Vec::new()
                    }
                };
                categories.sort_by_key(Category::sort_key);
                Arc::new(categories)
            })
            .await
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Flips from false to true exactly once, when the tools fetch settles
    pub fn loaded(&self) -> watch::Receiver<bool> {
        self.loaded.subscribe()
    }

    pub async fn wait_loaded(&self) {
        let mut rx = self.loaded();
        // The sender lives as long as self, so this only returns once loaded
        let _ = rx.wait_for(|loaded| *loaded).await;
    }
}
