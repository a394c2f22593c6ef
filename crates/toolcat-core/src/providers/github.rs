// GitHub provider - bridges the API client with RepoMetadataSource
use async_trait::async_trait;
use toolcat_api::{GitHubClient, GitHubRepo};

use crate::{
    models::RepoRef,
    providers::{RepoMetadata, RepoMetadataSource},
    Result,
};

/// Wrapper around GitHubClient that implements RepoMetadataSource
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepoMetadataSource for GitHubProvider {
    async fn repository(&self, repo: &RepoRef) -> Result<Option<RepoMetadata>> {
        let found = self.client.get_repository(&repo.owner, &repo.name).await?;
        Ok(found.map(github_to_metadata))
    }

    async fn contributors(&self, repo: &RepoRef, per_page: u32) -> Result<Vec<String>> {
        let contributors = self
            .client
            .get_contributors(&repo.owner, &repo.name, per_page)
            .await?
            .unwrap_or_default();

        Ok(contributors.into_iter().map(|c| c.login).collect())
    }
}

/// Convert the GitHub API repo into the fields the catalogue merges
fn github_to_metadata(gh: GitHubRepo) -> RepoMetadata {
    RepoMetadata {
        stars: gh.stargazers_count,
        description: gh.description.filter(|d| !d.trim().is_empty()),
        homepage: gh.homepage.filter(|h| !h.trim().is_empty()),
        owner_login: Some(gh.owner.login),
        license_spdx: gh.license.and_then(|l| l.spdx_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_upstream_fields_are_dropped() {
        let gh: GitHubRepo = serde_json::from_value(serde_json::json!({
            "full_name": "owasp/zap",
            "description": "",
            "homepage": "   ",
            "stargazers_count": 12000,
            "owner": { "login": "owasp" },
            "license": { "key": "apache-2.0", "name": "Apache License 2.0", "spdx_id": "Apache-2.0" }
        }))
        .unwrap();

        let meta = github_to_metadata(gh);
        assert_eq!(meta.stars, 12000);
        assert_eq!(meta.description, None);
        assert_eq!(meta.homepage, None);
        assert_eq!(meta.owner_login.as_deref(), Some("owasp"));
        assert_eq!(meta.license_spdx.as_deref(), Some("Apache-2.0"));
    }
}
