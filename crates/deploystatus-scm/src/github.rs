//! GitHub API client for repository deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deploystatus_core::{
    Deployment, DeploymentInput, DeploymentService, DeploymentStatus, DeploymentStatusInput,
    Error, FullRepoName, Result,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "deploystatus";
const PER_PAGE: usize = 100;

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl GitHubClient {
    /// Create a client for a GitHub server.
    ///
    /// `github.com` uses the public API; any other server is treated as
    /// GitHub Enterprise with its API under `/api/v3`.
    pub fn new(server: &str, access_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Client {
                server: server.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            api_url: api_url(server),
            access_token,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        if self.access_token.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", self.access_token))
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
        repo: &FullRepoName,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::api(action, repo, format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("repository {}", repo)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::api(action, repo, format!("({}) {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::api(action, repo, format!("parse error: {}", e)))
    }
}

#[async_trait]
impl DeploymentService for GitHubClient {
    async fn list_deployments(&self, repo: &FullRepoName) -> Result<Vec<Deployment>> {
        let mut deployments = Vec::new();
        let mut page = 1;
        loop {
            let url = format!(
                "{}/repos/{}/{}/deployments?page={}&per_page={}",
                self.api_url, repo.owner, repo.name, page, PER_PAGE
            );
            let batch: Vec<GitHubDeployment> = self
                .send(
                    self.request(reqwest::Method::GET, &url),
                    "list Deployments",
                    repo,
                )
                .await?;

            let done = batch.len() < PER_PAGE;
            deployments.extend(batch.into_iter().map(|d| d.into_deployment(repo)));
            if done {
                return Ok(deployments);
            }
            page += 1;
        }
    }

    async fn create_deployment(
        &self,
        repo: &FullRepoName,
        input: &DeploymentInput,
    ) -> Result<Deployment> {
        let url = format!(
            "{}/repos/{}/{}/deployments",
            self.api_url, repo.owner, repo.name
        );
        let payload = CreateDeployment {
            r#ref: &input.git_ref,
            task: &input.task,
            auto_merge: input.auto_merge,
            required_contexts: input.required_contexts.as_deref(),
            payload: &input.payload,
            environment: &input.environment,
            description: &input.description,
            transient_environment: input.transient_environment,
            production_environment: input.production_environment,
        };

        let deployment: GitHubDeployment = self
            .send(
                self.request(reqwest::Method::POST, &url).json(&payload),
                &format!("create Deployment with ref {}", input.git_ref),
                repo,
            )
            .await?;
        Ok(deployment.into_deployment(repo))
    }

    async fn create_deployment_status(
        &self,
        repo: &FullRepoName,
        deployment_id: &str,
        input: &DeploymentStatusInput,
    ) -> Result<DeploymentStatus> {
        let url = format!(
            "{}/repos/{}/{}/deployments/{}/statuses",
            self.api_url, repo.owner, repo.name, deployment_id
        );
        let payload = CreateDeploymentStatus {
            state: &input.state,
            target_url: &input.target_link,
            log_url: &input.log_link,
            description: &input.description,
            environment: &input.environment,
            environment_url: &input.environment_link,
            auto_inactive: input.auto_inactive,
        };

        let status: GitHubDeploymentStatus = self
            .send(
                self.request(reqwest::Method::POST, &url).json(&payload),
                &format!("create DeploymentStatus on deployment {}", deployment_id),
                repo,
            )
            .await?;
        Ok(status.into())
    }
}

fn api_url(server: &str) -> String {
    let server = server.trim_end_matches('/');
    match server {
        "" | "https://github.com" | "http://github.com" => "https://api.github.com".to_string(),
        _ => format!("{}/api/v3", server),
    }
}

#[derive(Debug, Serialize)]
struct CreateDeployment<'a> {
    r#ref: &'a str,
    task: &'a str,
    auto_merge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_contexts: Option<&'a [String]>,
    payload: &'a str,
    environment: &'a str,
    description: &'a str,
    transient_environment: bool,
    production_environment: bool,
}

#[derive(Debug, Serialize)]
struct CreateDeploymentStatus<'a> {
    state: &'a str,
    target_url: &'a str,
    log_url: &'a str,
    description: &'a str,
    environment: &'a str,
    environment_url: &'a str,
    auto_inactive: bool,
}

/// Deployment as returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct GitHubDeployment {
    id: i64,
    #[serde(default)]
    sha: String,
    #[serde(default)]
    r#ref: String,
    #[serde(default)]
    task: String,
    #[serde(default)]
    environment: String,
    #[serde(default)]
    original_environment: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    transient_environment: bool,
    #[serde(default)]
    production_environment: bool,
    created_at: Option<DateTime<Utc>>,
}

impl GitHubDeployment {
    fn into_deployment(self, repo: &FullRepoName) -> Deployment {
        Deployment {
            id: self.id.to_string(),
            namespace: repo.owner.clone(),
            name: repo.name.clone(),
            link: self.url,
            sha: self.sha,
            git_ref: self.r#ref,
            task: self.task,
            description: self.description.unwrap_or_default(),
            environment: self.environment,
            original_environment: self.original_environment,
            production_environment: self.production_environment,
            transient_environment: self.transient_environment,
            created: self.created_at,
        }
    }
}

/// Deployment status as returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct GitHubDeploymentStatus {
    id: i64,
    #[serde(default)]
    state: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    environment: String,
    #[serde(default)]
    environment_url: String,
    #[serde(default)]
    target_url: String,
    #[serde(default)]
    log_url: String,
    created_at: Option<DateTime<Utc>>,
}

impl From<GitHubDeploymentStatus> for DeploymentStatus {
    fn from(s: GitHubDeploymentStatus) -> Self {
        Self {
            id: s.id.to_string(),
            state: s.state,
            description: s.description.unwrap_or_default(),
            environment: s.environment,
            environment_link: s.environment_url,
            target_link: s.target_url,
            log_link: s.log_url,
            created: s.created_at,
        }
    }
}
