//! Structured outcome of reconciling one repository and environment.

use chrono::{DateTime, Utc};
use deploystatus_core::{Environment, FullRepoName};
use tracing::{debug, info, warn};

/// Why a reconciliation made no provider changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The release has no version, so no ref can be formed.
    MissingVersion,
    /// The release was not deployed after the deploy cutoff.
    OutsideDeployWindow {
        last_deployed: Option<DateTime<Utc>>,
        cutoff: DateTime<Utc>,
    },
    /// The provider client has no deployment capability.
    DeploymentsUnsupported { server: String },
    /// The existing deployment already points at the release ref.
    Unchanged { git_ref: String },
}

/// Something that happened while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    SourceUnparsable {
        source: String,
        message: String,
    },
    RepositoryRedirected {
        from: FullRepoName,
        to: FullRepoName,
    },
    ExistingDeployment {
        id: String,
        link: String,
        git_ref: String,
    },
    DeploymentCreated {
        id: String,
        link: String,
        git_ref: String,
    },
    StatusCreated {
        deployment_id: String,
        status_id: String,
        git_ref: String,
        log_link: String,
        target_link: String,
    },
    Skipped(SkipReason),
}

impl ReconcileEvent {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ReconcileEvent::SourceUnparsable { .. }
                | ReconcileEvent::Skipped(SkipReason::MissingVersion)
                | ReconcileEvent::Skipped(SkipReason::DeploymentsUnsupported { .. })
        )
    }
}

/// Events recorded for one (repository, environment, release) unit.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Repository the release was reported against, after source matching.
    pub repository: FullRepoName,
    pub environment: Environment,
    pub release: String,
    pub events: Vec<ReconcileEvent>,
}

impl Reconciliation {
    pub fn new(repository: FullRepoName, environment: Environment, release: &str) -> Self {
        Self {
            repository,
            environment,
            release: release.to_string(),
            events: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, event: ReconcileEvent) {
        self.events.push(event);
    }

    pub(crate) fn skip(mut self, reason: SkipReason) -> Self {
        self.events.push(ReconcileEvent::Skipped(reason));
        self
    }

    /// The skip reason, if nothing was changed on the provider.
    pub fn skipped(&self) -> Option<&SkipReason> {
        self.events.iter().find_map(|e| match e {
            ReconcileEvent::Skipped(reason) => Some(reason),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ReconcileEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }

    /// Emit every event through `tracing`.
    pub fn log(&self) {
        let repository = &self.repository;
        let environment = &self.environment.name;
        for event in &self.events {
            match event {
                ReconcileEvent::SourceUnparsable { source, message } => {
                    warn!(%repository, source = %source, error = %message, "Failed to parse git URL from chart source");
                }
                ReconcileEvent::RepositoryRedirected { from, to } => {
                    info!(from = %from, to = %to, "Using repository from chart sources");
                }
                ReconcileEvent::ExistingDeployment { id, link, git_ref } => {
                    info!(%repository, %environment, deployment = %id, git_ref = %git_ref, link = %link, "Found existing deployment");
                }
                ReconcileEvent::DeploymentCreated { id, link, git_ref } => {
                    info!(%repository, %environment, deployment = %id, git_ref = %git_ref, link = %link, "Created Deployment");
                }
                ReconcileEvent::StatusCreated {
                    deployment_id,
                    status_id,
                    git_ref,
                    log_link,
                    target_link,
                } => {
                    info!(
                        %repository,
                        %environment,
                        deployment = %deployment_id,
                        status = %status_id,
                        git_ref = %git_ref,
                        logs = %log_link,
                        target = %target_link,
                        "Created DeploymentStatus"
                    );
                }
                ReconcileEvent::Skipped(SkipReason::MissingVersion) => {
                    warn!(release = %self.release, %environment, "Missing version for release");
                }
                ReconcileEvent::Skipped(SkipReason::OutsideDeployWindow {
                    last_deployed,
                    cutoff,
                }) => {
                    debug!(release = %self.release, %environment, ?last_deployed, %cutoff, "Release not deployed recently, skipping");
                }
                ReconcileEvent::Skipped(SkipReason::DeploymentsUnsupported { server }) => {
                    warn!(%repository, server = %server, "Cannot update deployment status as the git server does not support Deployments");
                }
                ReconcileEvent::Skipped(SkipReason::Unchanged { git_ref }) => {
                    info!(%repository, %environment, git_ref = %git_ref, "Existing deployment is the same version as release, skipping");
                }
            }
        }
    }
}
