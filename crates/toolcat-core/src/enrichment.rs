// Live star counts for the detail view, cached for a day
use std::sync::Arc;
use toolcat_cache::{ttl, StarCache};
use tracing::{debug, error, warn};

use crate::models::{RepoRef, Tool};
use crate::providers::RepoMetadataSource;

/// Wall-clock source in epoch milliseconds
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Resolves a tool's current star count
///
/// Fresh cache entries are served without touching the network. On any remote
/// failure the dataset's own value comes back and the cache is left alone.
/// Calls are independent; two lookups for the same tool may both hit GitHub.
pub struct StarsResolver {
    source: Arc<dyn RepoMetadataSource>,
    cache: StarCache,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl StarsResolver {
    pub fn new(source: Arc<dyn RepoMetadataSource>, cache: StarCache) -> Self {
        Self {
            source,
            cache,
            clock: Arc::new(SystemClock),
            ttl_ms: ttl::DEFAULT_TTL_MS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl_hours(mut self, hours: u64) -> Self {
        self.ttl_ms = ttl::hours_to_ms(hours);
        self
    }

    pub async fn stars_for(&self, tool: &Tool) -> Option<u32> {
        let Some(raw_repo) = tool.github_repo() else {
            return tool.stars;
        };

        let now = self.clock.now_millis();
        match self.cache.get(&tool.id) {
            Ok(Some(entry)) if ttl::is_fresh(entry.fetched_at_ms, now, self.ttl_ms) => {
                debug!("Star cache hit for {}", tool.id);
                return Some(entry.stars);
            }
            Ok(_) => debug!("Star cache miss for {}", tool.id),
            Err(e) => warn!("Star cache read failed for {}: {}", tool.id, e),
        }

        let Some(repo) = RepoRef::parse(raw_repo) else {
            warn!("Invalid GitHub repo format for {}: {}", tool.id, raw_repo);
            return tool.stars;
        };

        match self.source.repository(&repo).await {
            Ok(Some(meta)) => {
                if let Err(e) = self.cache.put(&tool.id, meta.stars, now) {
                    warn!("Failed to cache stars for {}: {}", tool.id, e);
                }
                Some(meta.stars)
            }
            Ok(None) => {
                warn!("GitHub repository {} not found", repo);
                tool.stars
            }
            Err(e) => {
                error!("Error fetching GitHub stars for {}: {}", repo, e);
                tool.stars
            }
        }
    }
}
