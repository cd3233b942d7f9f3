//! Deployment types and the provider deployment capability.
//!
//! Deployments and their statuses are owned by the git provider. Not every
//! provider supports them, so the operations live on a separate
//! [`DeploymentService`] trait that only capable clients expose.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{FullRepoName, GitKind, Result};

/// A provider-side record of one versioned rollout to an environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    /// Repository owner.
    pub namespace: String,
    /// Repository short name.
    pub name: String,
    pub link: String,
    pub sha: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub task: String,
    pub description: String,
    pub environment: String,
    pub original_environment: String,
    pub production_environment: bool,
    pub transient_environment: bool,
    pub created: Option<DateTime<Utc>>,
}

/// An append-only status entry attached to a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub id: String,
    pub state: String,
    pub description: String,
    pub environment: String,
    pub environment_link: String,
    pub target_link: String,
    pub log_link: String,
    pub created: Option<DateTime<Utc>>,
}

/// Request to create a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentInput {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub task: String,
    pub payload: String,
    pub environment: String,
    pub description: String,
    pub required_contexts: Option<Vec<String>>,
    pub auto_merge: bool,
    pub transient_environment: bool,
    pub production_environment: bool,
}

/// Request to create a deployment status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatusInput {
    pub state: String,
    pub target_link: String,
    pub log_link: String,
    pub description: String,
    pub environment: String,
    pub environment_link: String,
    /// Mark earlier statuses of the environment inactive.
    pub auto_inactive: bool,
}

/// Deployment operations of a git provider.
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// List the deployments of a repository.
    ///
    /// Returns [`crate::Error::NotFound`] when the provider does not know the
    /// repository.
    async fn list_deployments(&self, repo: &FullRepoName) -> Result<Vec<Deployment>>;

    /// Create a deployment on a repository.
    async fn create_deployment(
        &self,
        repo: &FullRepoName,
        input: &DeploymentInput,
    ) -> Result<Deployment>;

    /// Append a status to an existing deployment.
    async fn create_deployment_status(
        &self,
        repo: &FullRepoName,
        deployment_id: &str,
        input: &DeploymentStatusInput,
    ) -> Result<DeploymentStatus>;
}

/// Handle to a git provider.
///
/// Clients of providers that support deployments carry a
/// [`DeploymentService`]; the others only describe the server.
#[derive(Clone)]
pub enum ScmClient {
    Deploying {
        kind: GitKind,
        server: String,
        service: Arc<dyn DeploymentService>,
    },
    Basic {
        kind: GitKind,
        server: String,
    },
}

impl ScmClient {
    pub fn deploying(
        kind: GitKind,
        server: impl Into<String>,
        service: Arc<dyn DeploymentService>,
    ) -> Self {
        Self::Deploying {
            kind,
            server: server.into(),
            service,
        }
    }

    pub fn basic(kind: GitKind, server: impl Into<String>) -> Self {
        Self::Basic {
            kind,
            server: server.into(),
        }
    }

    pub fn kind(&self) -> &GitKind {
        match self {
            ScmClient::Deploying { kind, .. } | ScmClient::Basic { kind, .. } => kind,
        }
    }

    pub fn server(&self) -> &str {
        match self {
            ScmClient::Deploying { server, .. } | ScmClient::Basic { server, .. } => server,
        }
    }

    /// The deployment capability, if the provider has one.
    pub fn deployments(&self) -> Option<&dyn DeploymentService> {
        match self {
            ScmClient::Deploying { service, .. } => Some(service.as_ref()),
            ScmClient::Basic { .. } => None,
        }
    }
}

impl std::fmt::Debug for ScmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScmClient")
            .field("kind", &self.kind())
            .field("server", &self.server())
            .field("deployments", &self.deployments().is_some())
            .finish()
    }
}
