use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::retry::{is_retryable_status, with_retry, RetryConfig, Retryable};

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "Toolcat-Catalogue-Updater";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {url} returned {status}")]
    RequestFailed {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl Retryable for GitHubError {
    fn is_retryable(&self) -> bool {
        match self {
            GitHubError::RequestFailed { status, .. } => is_retryable_status(*status),
            GitHubError::NetworkError(e) => e.is_timeout() || e.is_connect(),
            // Quota resets hourly; hammering it again will not help
            GitHubError::RateLimitExceeded => false,
            GitHubError::AuthRequired | GitHubError::ParseError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// Read-only GitHub REST client for repository metadata
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
    retry_config: RetryConfig,
    // Per-run memo of successful responses, keyed by request URL
    response_cache: Option<Mutex<HashMap<String, serde_json::Value>>>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise or a local test server
    pub fn with_base_url(token: Option<String>, base_url: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            token: token.filter(|t| !t.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_config: RetryConfig::default(),
            response_cache: None,
        })
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Remember every successful response for the lifetime of this client
    pub fn with_response_cache(mut self) -> Self {
        self.response_cache = Some(Mutex::new(HashMap::new()));
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch repository metadata. `Ok(None)` means GitHub answered 404.
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Option<GitHubRepo>> {
        let url = format!(
            "{}/repos/{}/{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );

        let Some(value) = self.get_json(&url).await? else {
            return Ok(None);
        };
        let repo: GitHubRepo = serde_json::from_value(value)?;
        debug!("Fetched {} ({} stars)", repo.full_name, repo.stargazers_count);
        Ok(Some(repo))
    }

    /// Fetch the top contributors, most active first
    pub async fn get_contributors(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Option<Vec<Contributor>>> {
        let url = format!(
            "{}/repos/{}/{}/contributors?per_page={}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            per_page
        );

        match self.get_json(&url).await? {
            // An empty repository answers 204 with no body
            Some(serde_json::Value::Null) => Ok(Some(Vec::new())),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Option<serde_json::Value>> {
        if let Some(cache) = &self.response_cache {
            if let Some(hit) = cache.lock().await.get(url) {
                debug!("Response cache hit for {}", url);
                return Ok(Some(hit.clone()));
            }
        }

        let value = with_retry(&self.retry_config, || async {
            let mut request = self.client.get(url);

            if let Some(ref token) = self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(GitHubError::AuthRequired);
            }

            // 403 is the hourly quota; a 429 falls through to RequestFailed
            if status == reqwest::StatusCode::FORBIDDEN {
                return Err(GitHubError::RateLimitExceeded);
            }

            if status == reqwest::StatusCode::NO_CONTENT {
                return Ok(Some(serde_json::Value::Null));
            }

            if !status.is_success() {
                return Err(GitHubError::RequestFailed {
                    status,
                    url: url.to_string(),
                });
            }

            let body = response.text().await?;
            Ok(Some(serde_json::from_str::<serde_json::Value>(&body)?))
        })
        .await?;

        if let (Some(cache), Some(value)) = (&self.response_cache, &value) {
            cache.lock().await.insert(url.to_string(), value.clone());
        }

        Ok(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    pub owner: GitHubOwner,
    pub license: Option<GitHubLicense>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLicense {
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn nuclei() -> serde_json::Value {
        json!({
            "full_name": "projectdiscovery/nuclei",
            "description": "Fast vulnerability scanner",
            "homepage": "https://docs.projectdiscovery.io",
            "stargazers_count": 21000,
            "owner": { "login": "projectdiscovery" },
            "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" }
        })
    }

    fn client(server: &MockServer) -> GitHubClient {
        GitHubClient::with_base_url(None, server.uri())
            .unwrap()
            .with_retry_config(RetryConfig::none())
    }

    fn quick_retries() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_delay: std::time::Duration::from_millis(5),
            max_delay: std::time::Duration::from_millis(10),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_get_repository_parses_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/projectdiscovery/nuclei"))
            .and(header("accept", "application/vnd.github.v3+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(nuclei()))
            .mount(&server)
            .await;

        let repo = client(&server)
            .get_repository("projectdiscovery", "nuclei")
            .await
            .unwrap()
            .expect("repository should exist");

        assert_eq!(repo.stargazers_count, 21000);
        assert_eq!(repo.owner.login, "projectdiscovery");
        assert_eq!(repo.license.and_then(|l| l.spdx_id).as_deref(), Some("MIT"));
    }

    #[tokio::test]
    async fn test_token_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/projectdiscovery/nuclei"))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(nuclei()))
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::with_base_url(Some("s3cret".into()), server.uri()).unwrap();
        assert!(client.is_authenticated());
        assert!(client
            .get_repository("projectdiscovery", "nuclei")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_not_found_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let repo = client(&server).get_repository("nobody", "nothing").await.unwrap();
        assert!(repo.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/broken/repo"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).get_repository("broken", "repo").await.unwrap_err();
        assert!(matches!(err, GitHubError::RequestFailed { status, .. } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_invalid_json_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/garbage/repo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server).get_repository("garbage", "repo").await.unwrap_err();
        assert!(matches!(err, GitHubError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_forbidden_is_a_rate_limit_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .with_retry_config(quick_retries())
            .get_repository("projectdiscovery", "nuclei")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::RateLimitExceeded));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/projectdiscovery/nuclei"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/projectdiscovery/nuclei"))
            .respond_with(ResponseTemplate::new(200).set_body_json(nuclei()))
            .expect(1)
            .mount(&server)
            .await;

        let repo = client(&server)
            .with_retry_config(quick_retries())
            .get_repository("projectdiscovery", "nuclei")
            .await
            .unwrap();
        assert_eq!(repo.map(|r| r.stargazers_count), Some(21000));
    }

    #[tokio::test]
    async fn test_contributors_are_returned_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/projectdiscovery/nuclei/contributors"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "login": "alice", "contributions": 90 },
                { "login": "bob", "contributions": 50 }
            ])))
            .mount(&server)
            .await;

        let contributors = client(&server)
            .get_contributors("projectdiscovery", "nuclei", 5)
            .await
            .unwrap()
            .unwrap();

        let logins: Vec<_> = contributors.into_iter().map(|c| c.login).collect();
        assert_eq!(logins, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_empty_repository_has_no_contributors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/someone/empty/contributors"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let contributors = client(&server)
            .get_contributors("someone", "empty", 5)
            .await
            .unwrap();
        assert_eq!(contributors.map(|c| c.len()), Some(0));
    }

    #[tokio::test]
    async fn test_response_cache_avoids_repeat_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/projectdiscovery/nuclei"))
            .respond_with(ResponseTemplate::new(200).set_body_json(nuclei()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).with_response_cache();
        client.get_repository("projectdiscovery", "nuclei").await.unwrap();
        client.get_repository("projectdiscovery", "nuclei").await.unwrap();
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = GitHubClient::new(Some("  ".to_string())).unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_secondary_rate_limit_is_retryable() {
        let err = GitHubError::RequestFailed {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            url: "https://api.github.com/repos/a/b".into(),
        };
        assert!(err.is_retryable());
        assert!(!GitHubError::RateLimitExceeded.is_retryable());
    }
}
