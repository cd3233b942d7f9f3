//! Run driver - walks the release report and reconciles each release.

use chrono::Utc;
use deploystatus_config::{
    Requirements, SourceConfig, deploy_cutoff, load_release_report, load_requirements,
    load_source_config,
};
use deploystatus_core::{FullRepoName, NamespaceReleases, Release};
use deploystatus_scm::ScmClientRegistry;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::environment::EnvironmentResolver;
use crate::error::{StatusError, StatusResult};
use crate::event::Reconciliation;
use crate::reconciler::{DeploymentReconciler, ReconcileOptions, ReconcileTarget};

/// Settings for one status run.
#[derive(Debug, Clone)]
pub struct StatusOptions {
    /// Root of the GitOps repository.
    pub dir: PathBuf,
    /// Fail the run on the first repository that cannot be updated.
    pub fail_on_error: bool,
    pub auto_inactive: bool,
    /// Only releases deployed within this window are updated; empty disables
    /// the filter.
    pub deploy_offset: String,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            fail_on_error: false,
            auto_inactive: true,
            deploy_offset: "2h".to_string(),
        }
    }
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reconciliations: Vec<Reconciliation>,
    /// Repositories that could not be updated, when not failing on error.
    pub failures: Vec<StatusError>,
}

impl RunSummary {
    /// Number of reconciliations that changed something on the provider.
    pub fn updated(&self) -> usize {
        self.reconciliations
            .iter()
            .filter(|r| r.skipped().is_none())
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.failures.len()
            + self
                .reconciliations
                .iter()
                .map(|r| r.warnings().count())
                .sum::<usize>()
    }
}

/// Iterates repository groups, or namespaces when no groups are declared,
/// and reconciles every matching release.
pub struct Driver {
    releases: Vec<NamespaceReleases>,
    requirements: Requirements,
    sources: SourceConfig,
    environments: EnvironmentResolver,
    reconciler: DeploymentReconciler,
    fail_on_error: bool,
}

impl Driver {
    pub fn new(
        releases: Vec<NamespaceReleases>,
        requirements: Requirements,
        sources: SourceConfig,
        reconciler: DeploymentReconciler,
        fail_on_error: bool,
    ) -> Self {
        let environments = EnvironmentResolver::from_requirements(&requirements);
        Self {
            releases,
            requirements,
            sources,
            environments,
            reconciler,
            fail_on_error,
        }
    }

    pub async fn run(&self, registry: &mut ScmClientRegistry) -> StatusResult<RunSummary> {
        let mut summary = RunSummary::default();
        if self.sources.spec.groups.is_empty() {
            self.run_cluster_owner(registry, &mut summary).await?;
        } else {
            self.run_groups(registry, &mut summary).await?;
        }
        Ok(summary)
    }

    async fn run_groups(
        &self,
        registry: &mut ScmClientRegistry,
        summary: &mut RunSummary,
    ) -> StatusResult<()> {
        for group in &self.sources.spec.groups {
            for repo in &group.repositories {
                let releases = self
                    .releases
                    .iter()
                    .flat_map(|nsr| nsr.releases.iter().map(move |r| (nsr.namespace.as_str(), r)))
                    .filter(|(_, release)| release.name == repo.name);

                // an error abandons the rest of this repository's releases
                for (namespace, release) in releases {
                    let target = ReconcileTarget {
                        owner: &group.owner,
                        provider: &group.provider,
                        kind: group.provider_kind.as_ref(),
                        repository: &repo.name,
                    };
                    if let Err(e) = self
                        .reconcile(registry, target, namespace, release, summary)
                        .await
                    {
                        self.handle_failure(e, summary)?;
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_cluster_owner(
        &self,
        registry: &mut ScmClientRegistry,
        summary: &mut RunSummary,
    ) -> StatusResult<()> {
        warn!("No source config groups found, assuming all repositories are owned by the environment git owner");

        let cluster = &self.requirements.cluster;
        let server = self.requirements.git_server();
        for nsr in &self.releases {
            for release in &nsr.releases {
                let target = ReconcileTarget {
                    owner: &cluster.environment_git_owner,
                    provider: server,
                    kind: cluster.git_kind.as_ref(),
                    repository: &release.name,
                };
                if let Err(e) = self
                    .reconcile(registry, target, &nsr.namespace, release, summary)
                    .await
                {
                    self.handle_failure(e, summary)?;
                }
            }
        }
        Ok(())
    }

    async fn reconcile(
        &self,
        registry: &mut ScmClientRegistry,
        target: ReconcileTarget<'_>,
        namespace: &str,
        release: &Release,
        summary: &mut RunSummary,
    ) -> StatusResult<()> {
        let environment = self.environments.resolve(namespace);
        let outcome = self
            .reconciler
            .reconcile(registry, target, &environment, release)
            .await
            .map_err(|e| {
                StatusError::repository(FullRepoName::new(target.owner, target.repository), e)
            })?;
        outcome.log();
        summary.reconciliations.push(outcome);
        Ok(())
    }

    fn handle_failure(&self, error: StatusError, summary: &mut RunSummary) -> StatusResult<()> {
        if self.fail_on_error {
            return Err(error);
        }
        warn!(error = %error, cause = %error_cause(&error), "Failed to update deployment status");
        summary.failures.push(error);
        Ok(())
    }
}

fn error_cause(error: &StatusError) -> String {
    match error {
        StatusError::Repository { source, .. } => source.to_string(),
        StatusError::Config(e) => e.to_string(),
    }
}

/// Load the GitOps repository at `options.dir` and report deployment status
/// for its releases.
///
/// Configuration errors always fail the run. A repository without a release
/// report has nothing to report.
pub async fn report_deployment_status(
    options: &StatusOptions,
    registry: &mut ScmClientRegistry,
) -> StatusResult<RunSummary> {
    let Some(releases) = load_release_report(&options.dir)? else {
        return Ok(RunSummary::default());
    };
    let requirements = load_requirements(&options.dir)?;
    let sources = load_source_config(&options.dir)?;
    let cutoff = deploy_cutoff(&options.deploy_offset, Utc::now())?;
    if let Some(cutoff) = cutoff {
        info!(%cutoff, "Only updating releases deployed after cutoff");
    }

    let reconciler = DeploymentReconciler::new(ReconcileOptions {
        auto_inactive: options.auto_inactive,
        deploy_cutoff: cutoff,
    });
    let driver = Driver::new(releases, requirements, sources, reconciler, options.fail_on_error);
    driver.run(registry).await
}
