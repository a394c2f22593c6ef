use std::sync::Arc;
use tracing::debug;

use crate::store::{KeyValueStore, Result};

const STARS_PREFIX: &str = "github_stars_";
const TIMESTAMP_PREFIX: &str = "github_stars_timestamp_";

/// A star count together with the moment it was fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedStars {
    pub stars: u32,
    pub fetched_at_ms: i64,
}

/// Star-count entries laid out as two keys per tool:
/// `github_stars_<id>` and `github_stars_timestamp_<id>`.
#[derive(Clone)]
pub struct StarCache {
    store: Arc<dyn KeyValueStore>,
}

impl StarCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Both keys must be present and parse; anything else reads as a miss.
    pub fn get(&self, tool_id: &str) -> Result<Option<CachedStars>> {
        let stars = self.store.get(&stars_key(tool_id))?;
        let timestamp = self.store.get(&timestamp_key(tool_id))?;

        let (Some(stars), Some(timestamp)) = (stars, timestamp) else {
            return Ok(None);
        };

        match (stars.trim().parse::<u32>(), timestamp.trim().parse::<i64>()) {
            (Ok(stars), Ok(fetched_at_ms)) => Ok(Some(CachedStars {
                stars,
                fetched_at_ms,
            })),
            _ => {
                debug!("Ignoring unparseable star cache entry for {}", tool_id);
                Ok(None)
            }
        }
    }

    pub fn put(&self, tool_id: &str, stars: u32, fetched_at_ms: i64) -> Result<()> {
        self.store.set(&stars_key(tool_id), &stars.to_string())?;
        self.store
            .set(&timestamp_key(tool_id), &fetched_at_ms.to_string())?;
        Ok(())
    }
}

pub fn stars_key(tool_id: &str) -> String {
    format!("{}{}", STARS_PREFIX, tool_id)
}

pub fn timestamp_key(tool_id: &str) -> String {
    format!("{}{}", TIMESTAMP_PREFIX, tool_id)
}
