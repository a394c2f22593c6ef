// Remote metadata providers
use async_trait::async_trait;

use crate::models::RepoRef;
use crate::Result;

pub mod github;

pub use github::GitHubProvider;

/// The slice of repository metadata the catalogue cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    pub stars: u32,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub owner_login: Option<String>,
    /// SPDX identifier as reported upstream, e.g. `MIT` or `NOASSERTION`
    pub license_spdx: Option<String>,
}

/// Source of live repository data - GitHub in production, fakes in tests
#[async_trait]
pub trait RepoMetadataSource: Send + Sync {
    /// `Ok(None)` when the repository does not exist upstream
    async fn repository(&self, repo: &RepoRef) -> Result<Option<RepoMetadata>>;

    /// Contributor logins, most active first
    async fn contributors(&self, repo: &RepoRef, per_page: u32) -> Result<Vec<String>>;
}
