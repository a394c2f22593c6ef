// GitHub REST client used for star lookups and dataset enrichment
pub mod github;
pub mod retry;

pub use github::{Contributor, GitHubClient, GitHubError, GitHubLicense, GitHubOwner, GitHubRepo};
pub use retry::RetryConfig;
