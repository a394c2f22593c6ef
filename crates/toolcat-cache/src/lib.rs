// Local key/value persistence for live star counts.
// Entries are only ever superseded, never deleted.

pub mod cache;
pub mod stars;
pub mod store;
pub mod ttl;

pub use cache::SqliteStore;
pub use stars::{CachedStars, StarCache};
pub use store::{CacheError, KeyValueStore, MemoryStore};
