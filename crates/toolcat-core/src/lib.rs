// Catalogue logic: dataset loading, filtering, enrichment and maintenance
pub mod catalogue;
pub mod config;
pub mod dataset;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod providers;
pub mod query;
pub mod search;
pub mod updater;

pub use catalogue::Catalogue;
pub use config::Config;
pub use dataset::{DatasetLoader, DatasetSource, FileSource, HttpSource};
pub use enrichment::{Clock, StarsResolver, SystemClock};
pub use error::Error;
pub use models::{Category, Maturity, RepoRef, Tool};
pub use query::{FilterOptions, SortDirection, SortField, SortOption};
pub use updater::{BatchUpdater, RecordOutcome, UpdateSummary, UpdaterOptions};

pub type Result<T> = std::result::Result<T, Error>;
