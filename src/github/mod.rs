//! Thin client for the GitHub REST endpoints the co-pilot reads and writes.

mod types;
mod url;

pub use self::types::*;
pub use self::url::{parse_repo_url, RepoSlug};

use crate::config::GitHubConfig;
use crate::error::{CopilotError, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const API_TIMEOUT_SECS: u64 = 30;
const COLLABORATOR_ADMIN_ERROR: &str =
    "Failed to manage collaborators. You must have admin rights to the repository.";

/// GitHub REST client with an optional bearer token
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client from the GitHub section of the configuration
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| CopilotError::Config(format!("Invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let http = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Creates a client against `api_base`, mostly for tests
    pub fn with_base(api_base: &str, token: Option<String>) -> Result<Self> {
        let config = GitHubConfig {
            api_base: api_base.to_string(),
            ..GitHubConfig::default()
        };
        Self::new(&config, token)
    }

    /// Whether requests carry a token
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: Method, url: &str, accept: &'static str) -> RequestBuilder {
        let builder = self.http.request(method, url).header(ACCEPT, accept);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET {}", url);
        let response = self.request(Method::GET, url, JSON_MEDIA_TYPE).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "request failed").await);
        }
        Ok(response.json().await?)
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, url: &str, body: &Value) -> Result<T> {
        debug!("{} {}", method, url);
        let response = self
            .request(method, url, JSON_MEDIA_TYPE)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response, "request failed").await);
        }
        Ok(response.json().await?)
    }

    /// Fetches repository metadata.
    ///
    /// 404 maps to [`CopilotError::RepoNotFound`], 403 to [`CopilotError::RateLimited`].
    pub async fn get_repository(&self, slug: &RepoSlug) -> Result<RepoDetails> {
        let url = self.url(&format!("/repos/{}/{}", slug.owner, slug.repo));
        let response = self.request(Method::GET, &url, JSON_MEDIA_TYPE).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(CopilotError::RepoNotFound(slug.to_string())),
            StatusCode::FORBIDDEN => Err(CopilotError::RateLimited(format!(
                "HTTP 403 for {}",
                slug
            ))),
            _ => Err(api_error(response, "Failed to load the repository").await),
        }
    }

    /// Lists the branch tree recursively
    pub async fn get_tree(&self, slug: &RepoSlug, branch: &str) -> Result<GitTree> {
        let url = self.url(&format!(
            "/repos/{}/{}/git/trees/{}?recursive=1",
            slug.owner, slug.repo, branch
        ));
        self.get_json(&url).await
    }

    /// Fetches a blob by its API URL, as listed in a tree entry
    pub async fn get_blob(&self, url: &str) -> Result<Blob> {
        self.get_json(url).await
    }

    /// Lists the most recent commits on `branch`
    pub async fn list_commits(
        &self,
        slug: &RepoSlug,
        branch: &str,
        per_page: usize,
    ) -> Result<Vec<CommitRecord>> {
        let url = self.url(&format!(
            "/repos/{}/{}/commits?sha={}&per_page={}",
            slug.owner, slug.repo, branch, per_page
        ));
        self.get_json(&url).await
    }

    /// Fetches a commit as a unified diff
    pub async fn get_commit_diff(&self, slug: &RepoSlug, sha: &str) -> Result<String> {
        let url = self.url(&format!("/repos/{}/{}/commits/{}", slug.owner, slug.repo, sha));
        let response = self.request(Method::GET, &url, DIFF_MEDIA_TYPE).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "Failed to fetch commit diff").await);
        }
        Ok(response.text().await?)
    }

    /// Weekly commit counts for the last year
    pub async fn commit_activity(&self, slug: &RepoSlug) -> Result<Vec<WeeklyActivity>> {
        let url = self.url(&format!("/repos/{}/{}/stats/commit_activity", slug.owner, slug.repo));
        self.get_stats(&url).await
    }

    /// Per-contributor commit totals
    pub async fn contributors(&self, slug: &RepoSlug) -> Result<Vec<ContributorStats>> {
        let url = self.url(&format!("/repos/{}/{}/stats/contributors", slug.owner, slug.repo));
        self.get_stats(&url).await
    }

    async fn get_stats<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request(Method::GET, url, JSON_MEDIA_TYPE).send().await?;
        match response.status() {
            StatusCode::ACCEPTED => Err(CopilotError::StatsPending),
            status if status.is_success() => Ok(response.json().await?),
            _ => Err(api_error(response, "Failed to fetch repository statistics").await),
        }
    }

    /// Issues (including pull requests, as GitHub lists them) updated since `since`
    pub async fn issues(&self, slug: &RepoSlug, since: &str) -> Result<Vec<IssueState>> {
        let url = self.url(&format!(
            "/repos/{}/{}/issues?state=all&since={}&per_page=100",
            slug.owner, slug.repo, since
        ));
        self.get_json(&url).await
    }

    /// The most recent pull requests in any state
    pub async fn pulls(&self, slug: &RepoSlug) -> Result<Vec<IssueState>> {
        let url = self.url(&format!(
            "/repos/{}/{}/pulls?state=all&per_page=100",
            slug.owner, slug.repo
        ));
        self.get_json(&url).await
    }

    /// Lists collaborators; needs push access to the repository
    pub async fn list_collaborators(&self, slug: &RepoSlug) -> Result<Vec<Collaborator>> {
        let url = self.url(&format!("/repos/{}/{}/collaborators", slug.owner, slug.repo));
        let response = self.request(Method::GET, &url, JSON_MEDIA_TYPE).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Err(CopilotError::GitHubApi {
                status: response.status().as_u16(),
                message: "Could not fetch collaborators. You might not have the necessary permissions, or the repository may be private.".into(),
            }),
            _ => Err(api_error(response, "Failed to list collaborators").await),
        }
    }

    /// Invites `username`; 201 (new invite) and 204 (already a collaborator) both succeed
    pub async fn add_collaborator(&self, slug: &RepoSlug, username: &str) -> Result<()> {
        let url = self.url(&format!(
            "/repos/{}/{}/collaborators/{}",
            slug.owner, slug.repo, username
        ));
        let response = self.request(Method::PUT, &url, JSON_MEDIA_TYPE).send().await?;
        collaborator_result(response, &[StatusCode::CREATED, StatusCode::NO_CONTENT])
    }

    /// Removes `username` from the repository
    pub async fn remove_collaborator(&self, slug: &RepoSlug, username: &str) -> Result<()> {
        let url = self.url(&format!(
            "/repos/{}/{}/collaborators/{}",
            slug.owner, slug.repo, username
        ));
        let response = self.request(Method::DELETE, &url, JSON_MEDIA_TYPE).send().await?;
        collaborator_result(response, &[StatusCode::NO_CONTENT])
    }

    /// Creates an empty repository for the authenticated user
    pub async fn create_repository(
        &self,
        name: &str,
        description: Option<&str>,
        private: bool,
    ) -> Result<RepoDetails> {
        let url = self.url("/user/repos");
        let body = json!({
            "name": name,
            "description": description,
            "private": private,
            "auto_init": false,
        });
        let response = self
            .request(Method::POST, &url, JSON_MEDIA_TYPE)
            .json(&body)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let details = match &body["errors"] {
            Value::Array(errors) if !errors.is_empty() => Value::Array(errors.clone()).to_string(),
            _ => body["message"]
                .as_str()
                .unwrap_or("Check if a repo with this name already exists.")
                .to_string(),
        };
        Err(CopilotError::GitHubApi {
            status,
            message: format!("Failed to create repo: {}", details),
        })
    }

    /// Uploads file content and returns the blob SHA
    pub async fn create_blob(&self, slug: &RepoSlug, content: &str, encoding: &str) -> Result<String> {
        let url = self.url(&format!("/repos/{}/{}/git/blobs", slug.owner, slug.repo));
        let object: GitObject = self
            .send_json(Method::POST, &url, &json!({ "content": content, "encoding": encoding }))
            .await?;
        Ok(object.sha)
    }

    /// Creates a tree from blob entries and returns its SHA
    pub async fn create_tree(&self, slug: &RepoSlug, entries: &[NewTreeEntry]) -> Result<String> {
        let url = self.url(&format!("/repos/{}/{}/git/trees", slug.owner, slug.repo));
        let object: GitObject = self
            .send_json(Method::POST, &url, &json!({ "tree": entries }))
            .await?;
        Ok(object.sha)
    }

    /// Creates a commit and returns its SHA
    pub async fn create_commit(
        &self,
        slug: &RepoSlug,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> Result<String> {
        let url = self.url(&format!("/repos/{}/{}/git/commits", slug.owner, slug.repo));
        let object: GitObject = self
            .send_json(
                Method::POST,
                &url,
                &json!({ "message": message, "tree": tree_sha, "parents": parents }),
            )
            .await?;
        Ok(object.sha)
    }

    /// Creates `refs/heads/<branch>` pointing at `sha`
    pub async fn create_ref(&self, slug: &RepoSlug, branch: &str, sha: &str) -> Result<()> {
        let url = self.url(&format!("/repos/{}/{}/git/refs", slug.owner, slug.repo));
        self.send_json::<Value>(
            Method::POST,
            &url,
            &json!({ "ref": format!("refs/heads/{}", branch), "sha": sha }),
        )
        .await
        .map(|_| ())
    }

    /// Moves the existing `refs/heads/<branch>` to `sha`
    pub async fn update_ref(&self, slug: &RepoSlug, branch: &str, sha: &str) -> Result<()> {
        let url = self.url(&format!(
            "/repos/{}/{}/git/refs/heads/{}",
            slug.owner, slug.repo, branch
        ));
        self.send_json::<Value>(Method::PATCH, &url, &json!({ "sha": sha }))
            .await
            .map(|_| ())
    }

    /// Points `refs/heads/<branch>` at `sha`, updating the ref when it already exists
    pub async fn point_branch(&self, slug: &RepoSlug, branch: &str, sha: &str) -> Result<()> {
        match self.create_ref(slug, branch, sha).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("creating ref failed ({}), updating instead", e);
                self.update_ref(slug, branch, sha).await
            }
        }
    }
}

async fn api_error(response: Response, context: &str) -> CopilotError {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| {
            format!(
                "{}: {}",
                context,
                status.canonical_reason().unwrap_or("unknown status")
            )
        });
    CopilotError::GitHubApi {
        status: status.as_u16(),
        message,
    }
}

fn collaborator_result(response: Response, accepted: &[StatusCode]) -> Result<()> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(());
    }
    let message = if status == StatusCode::FORBIDDEN {
        COLLABORATOR_ADMIN_ERROR.to_string()
    } else {
        format!("GitHub API responded with {}", status.as_u16())
    };
    Err(CopilotError::GitHubApi {
        status: status.as_u16(),
        message,
    })
}
