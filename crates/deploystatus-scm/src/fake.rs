//! In-memory deployment provider (testing only)
//!
//! `FakeDeployments` keeps deployments and statuses per repository and counts
//! every call so tests can assert that no provider traffic happened.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use deploystatus_core::{
    Deployment, DeploymentInput, DeploymentService, DeploymentStatus, DeploymentStatusInput,
    Error, FullRepoName, Result,
};

/// Counts of provider calls made against a [`FakeDeployments`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub create_deployment: usize,
    pub create_status: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list + self.create_deployment + self.create_status
    }
}

#[derive(Debug, Default)]
struct State {
    deployments: HashMap<String, Vec<Deployment>>,
    /// Keyed by `owner/name/deployment-id`.
    statuses: HashMap<String, Vec<DeploymentStatus>>,
    failing: HashSet<String>,
    calls: CallCounts,
}

/// In-memory deployment service backed by `HashMap`s.
#[derive(Debug, Default)]
pub struct FakeDeployments {
    state: Mutex<State>,
}

impl FakeDeployments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the existing deployments of a repository.
    pub fn with_deployments(self, repo: &FullRepoName, deployments: Vec<Deployment>) -> Self {
        self.state
            .lock()
            .unwrap()
            .deployments
            .insert(repo.to_string(), deployments);
        self
    }

    /// Make every call against `repo` fail with an API error.
    pub fn failing(self, repo: &FullRepoName) -> Self {
        self.state.lock().unwrap().failing.insert(repo.to_string());
        self
    }

    pub fn deployments(&self, repo: &FullRepoName) -> Vec<Deployment> {
        self.state
            .lock()
            .unwrap()
            .deployments
            .get(&repo.to_string())
            .cloned()
            .unwrap_or_default()
    }

    pub fn statuses(&self, repo: &FullRepoName, deployment_id: &str) -> Vec<DeploymentStatus> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .get(&status_key(repo, deployment_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of statuses across all repositories.
    pub fn status_count(&self) -> usize {
        self.state.lock().unwrap().statuses.values().map(Vec::len).sum()
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }
}

fn status_key(repo: &FullRepoName, deployment_id: &str) -> String {
    format!("{}/{}", repo, deployment_id)
}

fn check_failing(state: &State, action: &str, repo: &FullRepoName) -> Result<()> {
    if state.failing.contains(&repo.to_string()) {
        return Err(Error::api(action, repo, "injected failure"));
    }
    Ok(())
}

#[async_trait]
impl DeploymentService for FakeDeployments {
    async fn list_deployments(&self, repo: &FullRepoName) -> Result<Vec<Deployment>> {
        let mut state = self.state.lock().unwrap();
        state.calls.list += 1;
        check_failing(&state, "list Deployments", repo)?;
        state
            .deployments
            .get(&repo.to_string())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("repository {}", repo)))
    }

    async fn create_deployment(
        &self,
        repo: &FullRepoName,
        input: &DeploymentInput,
    ) -> Result<Deployment> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_deployment += 1;
        check_failing(&state, "create Deployment", repo)?;

        let deployments = state.deployments.entry(repo.to_string()).or_default();
        let deployment = Deployment {
            id: format!("deployment-{}", deployments.len() + 1),
            namespace: repo.owner.clone(),
            name: repo.name.clone(),
            link: format!("https://fake.com/{}/deployments/{}", repo, deployments.len() + 1),
            git_ref: input.git_ref.clone(),
            task: input.task.clone(),
            description: input.description.clone(),
            environment: input.environment.clone(),
            original_environment: input.environment.clone(),
            production_environment: input.production_environment,
            transient_environment: input.transient_environment,
            created: Some(Utc::now()),
            ..Default::default()
        };
        deployments.push(deployment.clone());
        Ok(deployment)
    }

    async fn create_deployment_status(
        &self,
        repo: &FullRepoName,
        deployment_id: &str,
        input: &DeploymentStatusInput,
    ) -> Result<DeploymentStatus> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_status += 1;
        check_failing(&state, "create DeploymentStatus", repo)?;

        let known = state
            .deployments
            .get(&repo.to_string())
            .is_some_and(|ds| ds.iter().any(|d| d.id == deployment_id));
        if !known {
            return Err(Error::NotFound(format!(
                "deployment {} in repository {}",
                deployment_id, repo
            )));
        }

        let statuses = state
            .statuses
            .entry(status_key(repo, deployment_id))
            .or_default();
        let status = DeploymentStatus {
            id: format!("status-{}", statuses.len() + 1),
            state: input.state.clone(),
            description: input.description.clone(),
            environment: input.environment.clone(),
            environment_link: input.environment_link.clone(),
            target_link: input.target_link.clone(),
            log_link: input.log_link.clone(),
            created: Some(Utc::now()),
        };
        statuses.push(status.clone());
        Ok(status)
    }
}
